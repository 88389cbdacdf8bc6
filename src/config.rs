use image::Rgb;

use crate::error::HandError;

/// Which landmark network to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelComplexity {
    /// Faster, less accurate network.
    Lite,
    #[default]
    Full,
}

impl ModelComplexity {
    /// File name of the ONNX model for this complexity.
    pub fn model_file(self) -> &'static str {
        match self {
            ModelComplexity::Lite => "hand_landmark_lite.onnx",
            ModelComplexity::Full => "hand_landmark_full.onnx",
        }
    }
}

impl TryFrom<u8> for ModelComplexity {
    type Error = HandError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ModelComplexity::Lite),
            1 => Ok(ModelComplexity::Full),
            other => Err(HandError::InvalidConfig(format!(
                "model complexity must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// Settings handed to the landmark backend.
#[derive(Debug, Clone, PartialEq)]
pub struct HandDetectorConfig {
    /// Treat every frame as unrelated, never reusing the previous hand region.
    pub static_image_mode: bool,
    pub max_hands: usize,
    pub model_complexity: ModelComplexity,
    /// Minimum presence score for a hand to be reported.
    pub min_detection_confidence: f32,
    /// Minimum presence score for the hand region to be reused on the next frame.
    pub min_tracking_confidence: f32,
}

impl Default for HandDetectorConfig {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            max_hands: 2,
            model_complexity: ModelComplexity::Full,
            min_detection_confidence: 0.8,
            min_tracking_confidence: 0.8,
        }
    }
}

impl HandDetectorConfig {
    pub fn with_static_image_mode(mut self, enabled: bool) -> Self {
        self.static_image_mode = enabled;
        self
    }

    pub fn with_max_hands(mut self, max_hands: usize) -> Self {
        self.max_hands = max_hands;
        self
    }

    pub fn with_model_complexity(mut self, complexity: ModelComplexity) -> Self {
        self.model_complexity = complexity;
        self
    }

    pub fn with_detection_confidence(mut self, confidence: f32) -> Self {
        self.min_detection_confidence = confidence;
        self
    }

    pub fn with_tracking_confidence(mut self, confidence: f32) -> Self {
        self.min_tracking_confidence = confidence;
        self
    }

    pub fn validate(&self) -> Result<(), HandError> {
        if self.max_hands == 0 {
            return Err(HandError::InvalidConfig(
                "max_hands must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(HandError::InvalidConfig(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Colours and sizes of the drawn annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub connection_color: Rgb<u8>,
    pub joint_color: Rgb<u8>,
    pub joint_radius: i32,
    pub landmark_color: Rgb<u8>,
    pub landmark_radius: i32,
    pub bbox_color: Rgb<u8>,
    pub bbox_padding: i32,
    pub bbox_thickness: u32,
    pub distance_color: Rgb<u8>,
    pub midpoint_color: Rgb<u8>,
    pub distance_radius: i32,
    pub distance_thickness: u32,
    pub text_color: Rgb<u8>,
    pub text_scale: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        let magenta = Rgb([255, 0, 255]);
        Self {
            connection_color: Rgb([255, 255, 255]),
            joint_color: Rgb([255, 0, 0]),
            joint_radius: 2,
            landmark_color: magenta,
            landmark_radius: 5,
            bbox_color: Rgb([0, 255, 0]),
            bbox_padding: 20,
            bbox_thickness: 2,
            distance_color: magenta,
            midpoint_color: Rgb([255, 0, 0]),
            distance_radius: 15,
            distance_thickness: 3,
            text_color: magenta,
            text_scale: 36.0,
        }
    }
}
