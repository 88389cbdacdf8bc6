pub mod model_mediapipe;

use image::RgbImage;
use nalgebra::Point3;

use crate::hand::LANDMARK_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

/// One hand as reported by a landmark backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHand {
    /// Landmark positions, x and y normalized to 0..1 of the image size, z relative to the wrist.
    pub landmarks: Vec<Point3<f32>>,
    /// Presence score of the hand, 0..1.
    pub confidence: f32,
    pub handedness: Handedness,
}

impl NormalizedHand {
    pub fn new(landmarks: Vec<Point3<f32>>, confidence: f32, handedness: Handedness) -> Self {
        if landmarks.len() != LANDMARK_COUNT {
            log::warn!(
                "backend produced {} landmarks instead of {}",
                landmarks.len(),
                LANDMARK_COUNT
            );
        }
        Self {
            landmarks,
            confidence,
            handedness,
        }
    }
}

/// A hand landmark detector the rest of the crate can run frames through.
///
/// Implementations own whatever state they carry between frames (such as the region a hand was
/// found in last time); callers only see one detection result per frame.
pub trait HandLandmarksModel {
    /// Detects hands in an RGB frame.
    fn process(&mut self, image: &RgbImage) -> anyhow::Result<Vec<NormalizedHand>>;
}

impl<M: HandLandmarksModel + ?Sized> HandLandmarksModel for Box<M> {
    fn process(&mut self, image: &RgbImage) -> anyhow::Result<Vec<NormalizedHand>> {
        (**self).process(image)
    }
}
