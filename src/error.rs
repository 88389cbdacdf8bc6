use std::fmt;

/// Precondition violations surfaced by the landmark queries.
#[derive(Debug, Clone, PartialEq)]
pub enum HandError {
    /// A bounding box was requested for zero points.
    EmptyPointSet,
    /// A landmark set does not contain the full 21-point skeleton.
    IncompleteHand { found: usize },
    /// A landmark index is not present in the current set.
    LandmarkOutOfRange { index: usize, len: usize },
    /// A hand number was requested that the last detection did not produce.
    HandOutOfRange { hand: usize, detected: usize },
    /// `find_position` was called before `find_hands`.
    NoDetection,
    /// A landmark query was made before `find_position` produced a hand.
    NoLandmarks,
    InvalidConfig(String),
}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandError::EmptyPointSet => write!(f, "cannot compute a bounding box of zero points"),
            HandError::IncompleteHand { found } => write!(
                f,
                "expected {} hand landmarks, found {}",
                crate::hand::LANDMARK_COUNT,
                found
            ),
            HandError::LandmarkOutOfRange { index, len } => {
                write!(f, "landmark {} out of range (hand has {} landmarks)", index, len)
            }
            HandError::HandOutOfRange { hand, detected } => {
                write!(f, "hand {} requested but only {} detected", hand, detected)
            }
            HandError::NoDetection => write!(f, "no detection result, call find_hands first"),
            HandError::NoLandmarks => write!(f, "no landmarks, call find_position first"),
            HandError::InvalidConfig(reason) => write!(f, "invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for HandError {}
