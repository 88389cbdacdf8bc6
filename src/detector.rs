//! The per-frame hand detection facade.

use std::path::Path;

use anyhow::Result;
use image::RgbImage;

use crate::config::{HandDetectorConfig, OverlayStyle};
use crate::error::HandError;
use crate::geometry::{self, DistanceMeasurement};
use crate::hand::{BoundingBox, FingerState, HandLandmarkSet};
use crate::hand_landmarks::model_mediapipe::MediapipeHandLandmarksModel;
use crate::hand_landmarks::{HandLandmarksModel, NormalizedHand};
use crate::overlay;

/// Landmarks of one hand together with their bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct HandPosition {
    pub landmarks: HandLandmarkSet,
    pub bbox: BoundingBox,
}

/// Runs a landmark model on frames and answers geometric queries about the result.
///
/// Queries depend on the previous step of the same frame: [`find_position`] reads the result of
/// the last [`find_hands`], and [`fingers_up`] / [`find_distance`] read the landmarks of the last
/// [`find_position`].
///
/// [`find_hands`]: HandDetector::find_hands
/// [`find_position`]: HandDetector::find_position
/// [`fingers_up`]: HandDetector::fingers_up
/// [`find_distance`]: HandDetector::find_distance
pub struct HandDetector {
    model: Box<dyn HandLandmarksModel>,
    config: HandDetectorConfig,
    style: OverlayStyle,
    results: Option<Vec<NormalizedHand>>,
    landmarks: Option<HandLandmarkSet>,
}

impl HandDetector {
    /// Wraps an arbitrary landmark backend.
    pub fn new(config: HandDetectorConfig, model: Box<dyn HandLandmarksModel>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            config,
            style: OverlayStyle::default(),
            results: None,
            landmarks: None,
        })
    }

    /// Uses the MediaPipe ONNX network from `model_dir`.
    pub fn mediapipe(config: HandDetectorConfig, model_dir: impl AsRef<Path>) -> Result<Self> {
        let model = MediapipeHandLandmarksModel::new(&config, model_dir)?;
        Self::new(config, Box::new(model))
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn config(&self) -> &HandDetectorConfig {
        &self.config
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Detects hands in `image` and, if `draw` is set, draws their skeletons onto it.
    ///
    /// Returns the number of hands found. Landmarks from a previous frame are discarded.
    pub fn find_hands(&mut self, image: &mut RgbImage, draw: bool) -> Result<usize> {
        let mut hands = self.model.process(image)?;
        hands.truncate(self.config.max_hands);
        log::debug!("detected {} hand(s)", hands.len());

        if draw {
            let (width, height) = image.dimensions();
            for hand in &hands {
                let set = HandLandmarkSet::from_normalized(&hand.landmarks, width, height);
                overlay::draw_hand_skeleton(image, &set, &self.style);
            }
        }

        let count = hands.len();
        self.results = Some(hands);
        self.landmarks = None;
        Ok(count)
    }

    /// The raw backend output of the last [`find_hands`](HandDetector::find_hands).
    pub fn results(&self) -> Option<&[NormalizedHand]> {
        self.results.as_deref()
    }

    /// Converts hand `hand_no` of the last detection to pixel space.
    ///
    /// Returns `Ok(None)` when no hand was detected. With `draw` set, every landmark is circled and
    /// the padded bounding box is drawn.
    pub fn find_position(
        &mut self,
        image: &mut RgbImage,
        hand_no: usize,
        draw: bool,
    ) -> Result<Option<HandPosition>, HandError> {
        let results = self.results.as_ref().ok_or(HandError::NoDetection)?;
        self.landmarks = None;

        if results.is_empty() {
            return Ok(None);
        }
        let hand = results.get(hand_no).ok_or(HandError::HandOutOfRange {
            hand: hand_no,
            detected: results.len(),
        })?;

        let (width, height) = image.dimensions();
        let landmarks = HandLandmarkSet::from_normalized(&hand.landmarks, width, height);
        let bbox = geometry::bounding_box(landmarks.points())?;

        if draw {
            overlay::draw_landmark_points(image, &landmarks, &self.style);
            overlay::draw_bounding_box(image, &bbox, &self.style);
        }

        self.landmarks = Some(landmarks.clone());
        Ok(Some(HandPosition { landmarks, bbox }))
    }

    /// The landmarks produced by the last [`find_position`](HandDetector::find_position).
    pub fn landmarks(&self) -> Option<&HandLandmarkSet> {
        self.landmarks.as_ref()
    }

    /// Which digits of the current hand are extended.
    pub fn fingers_up(&self) -> Result<FingerState, HandError> {
        let landmarks = self.landmarks.as_ref().ok_or(HandError::NoLandmarks)?;
        geometry::fingers_up(landmarks)
    }

    /// Distance between landmarks `p1` and `p2` of the current hand, annotated onto `image` if
    /// `draw` is set.
    pub fn find_distance(
        &self,
        p1: usize,
        p2: usize,
        image: &mut RgbImage,
        draw: bool,
    ) -> Result<DistanceMeasurement, HandError> {
        let landmarks = self.landmarks.as_ref().ok_or(HandError::NoLandmarks)?;
        let measurement = geometry::point_distance(landmarks, p1, p2)?;
        if draw {
            overlay::draw_distance(image, &measurement, &self.style);
        }
        Ok(measurement)
    }
}
