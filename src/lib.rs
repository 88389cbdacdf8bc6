//! Hand landmark detection on camera frames, with overlays and simple geometric features
//! (finger extension, landmark distances) derived from the landmarks.

pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod hand;
pub mod hand_landmarks;
pub mod overlay;

pub use config::{HandDetectorConfig, ModelComplexity, OverlayStyle};
pub use detector::{HandDetector, HandPosition};
pub use error::HandError;
pub use geometry::DistanceMeasurement;
pub use hand::{BoundingBox, Digit, FingerState, HandLandmarkSet, Landmark, LandmarkIdx};
pub use hand_landmarks::{HandLandmarksModel, Handedness, NormalizedHand};
