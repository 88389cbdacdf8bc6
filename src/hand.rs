use imageproc::rect::Rect;
use nalgebra::{Point2, Point3};

use crate::error::HandError;

/// Number of landmarks in the hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices of the five fingertips, thumb first.
pub const TIP_IDS: [usize; 5] = [4, 8, 12, 16, 20];

/// Names for the 21 hand landmarks.
///
/// - **CMC**: carpometacarpal joint, the lowest joint of the thumb near the wrist.
/// - **MCP**: metacarpophalangeal joint, the knuckle.
/// - **PIP**: proximal interphalangeal joint, between the MCP and the DIP.
/// - **DIP**: distal interphalangeal joint, the highest joint of a finger.
/// - **IP**: the thumb's single interphalangeal joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl From<LandmarkIdx> for usize {
    fn from(idx: LandmarkIdx) -> usize {
        idx as usize
    }
}

/// Pairs of landmarks joined by a bone in the skeleton overlay.
pub const HAND_CONNECTIONS: &[(LandmarkIdx, LandmarkIdx)] = {
    use LandmarkIdx::*;
    &[
        // palm
        (Wrist, ThumbCmc),
        (Wrist, IndexFingerMcp),
        (IndexFingerMcp, MiddleFingerMcp),
        (MiddleFingerMcp, RingFingerMcp),
        (RingFingerMcp, PinkyMcp),
        (Wrist, PinkyMcp),
        // thumb
        (ThumbCmc, ThumbMcp),
        (ThumbMcp, ThumbIp),
        (ThumbIp, ThumbTip),
        // index
        (IndexFingerMcp, IndexFingerPip),
        (IndexFingerPip, IndexFingerDip),
        (IndexFingerDip, IndexFingerTip),
        // middle
        (MiddleFingerMcp, MiddleFingerPip),
        (MiddleFingerPip, MiddleFingerDip),
        (MiddleFingerDip, MiddleFingerTip),
        // ring
        (RingFingerMcp, RingFingerPip),
        (RingFingerPip, RingFingerDip),
        (RingFingerDip, RingFingerTip),
        // pinky
        (PinkyMcp, PinkyPip),
        (PinkyPip, PinkyDip),
        (PinkyDip, PinkyTip),
    ]
};

/// A single landmark in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landmark {
    pub id: usize,
    pub x: i32,
    pub y: i32,
}

impl Landmark {
    pub fn new(id: usize, x: i32, y: i32) -> Self {
        Self { id, x, y }
    }

    pub fn point(&self) -> Point2<i32> {
        Point2::new(self.x, self.y)
    }
}

/// `floor((a + b) / 2)` without overflowing.
pub(crate) fn midpoint(a: i32, b: i32) -> i32 {
    // the mean of two i32 values is always an i32
    (i64::from(a) + i64::from(b)).div_euclid(2) as i32
}

/// The landmarks of one hand in one frame, in pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandLandmarkSet {
    landmarks: Vec<Landmark>,
}

impl HandLandmarkSet {
    /// Builds a set from pixel coordinates, numbering them in order.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let landmarks = points
            .into_iter()
            .enumerate()
            .map(|(id, (x, y))| Landmark::new(id, x, y))
            .collect();
        Self { landmarks }
    }

    /// Converts normalized (0..1) model output to pixel space of a `width` x `height` image.
    ///
    /// Coordinates are truncated towards zero.
    pub fn from_normalized(points: &[Point3<f32>], width: u32, height: u32) -> Self {
        Self::from_points(
            points
                .iter()
                .map(|p| ((p.x * width as f32) as i32, (p.y * height as f32) as i32)),
        )
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, index: usize) -> Result<Landmark, HandError> {
        self.landmarks
            .get(index)
            .copied()
            .ok_or(HandError::LandmarkOutOfRange {
                index,
                len: self.landmarks.len(),
            })
    }

    pub fn landmark(&self, idx: LandmarkIdx) -> Result<Landmark, HandError> {
        self.get(idx.into())
    }

    pub fn points(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.landmarks.iter().map(|lm| (lm.x, lm.y))
    }

    /// Fails unless the full 21-point skeleton is present.
    pub fn ensure_complete(&self) -> Result<(), HandError> {
        if self.landmarks.len() < LANDMARK_COUNT {
            return Err(HandError::IncompleteHand {
                found: self.landmarks.len(),
            });
        }
        Ok(())
    }
}

/// Axis-aligned box around a set of points, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl BoundingBox {
    pub fn new(xmin: i32, ymin: i32, xmax: i32, ymax: i32) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Grows the box by `padding` pixels on every side. Negative values shrink it.
    pub fn padded(&self, padding: i32) -> Self {
        Self {
            xmin: self.xmin.saturating_sub(padding),
            ymin: self.ymin.saturating_sub(padding),
            xmax: self.xmax.saturating_add(padding),
            ymax: self.ymax.saturating_add(padding),
        }
    }

    /// Saturates at `i32::MAX` for boxes spanning more than half the coordinate range.
    pub fn width(&self) -> i32 {
        self.xmax.saturating_sub(self.xmin)
    }

    pub fn height(&self) -> i32 {
        self.ymax.saturating_sub(self.ymin)
    }

    pub fn center(&self) -> (i32, i32) {
        (midpoint(self.xmin, self.xmax), midpoint(self.ymin, self.ymax))
    }

    pub fn to_tuple(&self) -> (i32, i32, i32, i32) {
        (self.xmin, self.ymin, self.xmax, self.ymax)
    }

    /// Rectangle for drawing; `imageproc` rejects empty rectangles so sizes are at least 1.
    pub fn to_rect(&self) -> Rect {
        Rect::at(self.xmin, self.ymin).of_size(
            self.width().max(1) as u32,
            self.height().max(1) as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digit {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Digit {
    pub const ALL: [Digit; 5] = [
        Digit::Thumb,
        Digit::Index,
        Digit::Middle,
        Digit::Ring,
        Digit::Pinky,
    ];

    /// Landmark index of this digit's tip.
    pub fn tip(self) -> usize {
        TIP_IDS[self as usize]
    }
}

/// Which digits are extended, thumb first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerState([bool; 5]);

impl FingerState {
    pub fn new(extended: [bool; 5]) -> Self {
        Self(extended)
    }

    pub fn is_extended(&self, digit: Digit) -> bool {
        self.0[digit as usize]
    }

    /// The state as `0`/`1` flags.
    pub fn flags(&self) -> [u8; 5] {
        self.0.map(u8::from)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|up| **up).count()
    }

    pub fn as_array(&self) -> [bool; 5] {
        self.0
    }
}
