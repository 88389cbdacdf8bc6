use std::path::Path;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbImage;
use nalgebra::Point3;
use ndarray::{Array, CowArray};
use ort::tensor::OrtOwnedTensor;
use ort::{Environment, ExecutionProvider, Session, SessionBuilder, Value};

use crate::config::HandDetectorConfig;
use crate::hand::LANDMARK_COUNT;
use crate::hand_landmarks::{HandLandmarksModel, Handedness, NormalizedHand};

/// Side length of the square network input.
const INPUT_SIZE: u32 = 224;

/// Padding added around the landmark extent when deriving the next frame's hand region,
/// as a fraction of its longer side.
const ROI_PADDING: f32 = 0.25;

/// Memory layout of the network's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputLayout {
    Nhwc,
    Nchw,
}

impl InputLayout {
    fn detect(session: &Session) -> Self {
        match session.inputs.first().map(|input| input.dimensions.as_slice()) {
            Some([_, Some(3), _, _]) => InputLayout::Nchw,
            _ => InputLayout::Nhwc,
        }
    }
}

/// Rectangle of the frame that is fed to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// The largest square centred in a `width` x `height` frame.
    pub fn centered_square(width: u32, height: u32) -> Self {
        let side = width.min(height);
        Self {
            x: (width - side) / 2,
            y: (height - side) / 2,
            width: side,
            height: side,
        }
    }

    /// A padded square around pixel-space `points`, clipped to the frame.
    ///
    /// Returns `None` if nothing of the square is left inside the frame.
    pub fn around_points(
        points: impl IntoIterator<Item = (f32, f32)>,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        let mut x_min = f32::MAX;
        let mut y_min = f32::MAX;
        let mut x_max = f32::MIN;
        let mut y_max = f32::MIN;
        for (x, y) in points {
            x_min = x_min.min(x);
            y_min = y_min.min(y);
            x_max = x_max.max(x);
            y_max = y_max.max(y);
        }
        if x_min > x_max || y_min > y_max {
            return None;
        }

        let center = ((x_min + x_max) / 2.0, (y_min + y_max) / 2.0);
        let side = (x_max - x_min).max(y_max - y_min) * (1.0 + 2.0 * ROI_PADDING);

        let x0 = (center.0 - side / 2.0).max(0.0);
        let y0 = (center.1 - side / 2.0).max(0.0);
        let width = side.min(image_width as f32 - x0);
        let height = side.min(image_height as f32 - y0);

        if width < 1.0 || height < 1.0 {
            return None;
        }

        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: width as u32,
            height: height as u32,
        })
    }
}

/// Runs the MediaPipe hand landmark network through ONNX Runtime.
///
/// The network regresses a single hand from a crop of the frame. Without a palm detector in
/// front of it, the first crop is the centred square of the frame; afterwards the crop follows the
/// hand for as long as its presence score stays above the tracking threshold.
pub struct MediapipeHandLandmarksModel {
    session: Arc<Session>,
    layout: InputLayout,
    config: HandDetectorConfig,
    region: Option<Region>,
}

impl MediapipeHandLandmarksModel {
    /// Loads the network matching `config.model_complexity` from `model_dir`.
    pub fn new(config: &HandDetectorConfig, model_dir: impl AsRef<Path>) -> Result<Self> {
        config.validate()?;

        let path = model_dir.as_ref().join(config.model_complexity.model_file());

        let environment = Environment::builder()
            .with_name("handtracking")
            .with_execution_providers([ExecutionProvider::CPU(Default::default())])
            .build()?
            .into_arc();

        let session = SessionBuilder::new(&environment)?
            .with_intra_threads(4)?
            .with_model_from_file(&path)
            .with_context(|| format!("failed to load hand landmark model {}", path.display()))?;

        let layout = InputLayout::detect(&session);
        log::info!("loaded {} ({:?} input)", path.display(), layout);

        if config.max_hands > 1 {
            log::debug!(
                "max_hands = {}, but the landmark network tracks a single hand",
                config.max_hands
            );
        }

        Ok(Self {
            session: Arc::new(session),
            layout,
            config: config.clone(),
            region: None,
        })
    }

    /// The region the next frame will be cropped to, if a hand is being tracked.
    pub fn tracked_region(&self) -> Option<Region> {
        self.region
    }

    fn input_tensor<'a>(&self, crop: &RgbImage) -> CowArray<'a, f32, ndarray::IxDyn> {
        let resized = imageops::resize(crop, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let size = INPUT_SIZE as usize;

        let array = match self.layout {
            InputLayout::Nhwc => Array::from_shape_fn((1, size, size, 3), |(_, y, x, c)| {
                resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
            }),
            InputLayout::Nchw => Array::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
                resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
            }),
        };

        array.into_dyn().into()
    }
}

impl HandLandmarksModel for MediapipeHandLandmarksModel {
    fn process(&mut self, image: &RgbImage) -> Result<Vec<NormalizedHand>> {
        let (image_width, image_height) = image.dimensions();
        ensure!(
            image_width > 0 && image_height > 0,
            "cannot process an empty frame"
        );

        let region = match self.region {
            Some(region) if !self.config.static_image_mode => region,
            _ => Region::centered_square(image_width, image_height),
        };

        let crop = imageops::crop_imm(image, region.x, region.y, region.width, region.height)
            .to_image();
        let array = self.input_tensor(&crop);

        let inputs = vec![Value::from_array(self.session.allocator(), &array)?];
        let outputs: Vec<Value> = self.session.run(inputs)?;
        ensure!(
            outputs.len() >= 3,
            "expected at least 3 model outputs, got {}",
            outputs.len()
        );

        let screen_landmarks: OrtOwnedTensor<f32, _> = outputs[0].try_extract()?;
        let screen_landmarks: Vec<f32> = screen_landmarks.view().iter().copied().collect();
        let presence: OrtOwnedTensor<f32, _> = outputs[1].try_extract()?;
        let presence = presence.view().iter().copied().next().unwrap_or(0.0);
        let handedness: OrtOwnedTensor<f32, _> = outputs[2].try_extract()?;
        let handedness = handedness.view().iter().copied().next().unwrap_or(0.0);

        log::trace!("presence={} handedness={}", presence, handedness);
        ensure!(
            screen_landmarks.len() >= LANDMARK_COUNT * 3,
            "expected {} landmark values, got {}",
            LANDMARK_COUNT * 3,
            screen_landmarks.len()
        );

        if presence < self.config.min_detection_confidence {
            self.region = None;
            return Ok(Vec::new());
        }

        // network output is in input pixels of the crop
        let scale_x = region.width as f32 / INPUT_SIZE as f32;
        let scale_y = region.height as f32 / INPUT_SIZE as f32;
        let pixels: Vec<(f32, f32, f32)> = screen_landmarks
            .chunks_exact(3)
            .take(LANDMARK_COUNT)
            .map(|c| {
                (
                    region.x as f32 + c[0] * scale_x,
                    region.y as f32 + c[1] * scale_y,
                    c[2] / INPUT_SIZE as f32,
                )
            })
            .collect();

        self.region = if !self.config.static_image_mode
            && presence >= self.config.min_tracking_confidence
        {
            Region::around_points(
                pixels.iter().map(|&(x, y, _)| (x, y)),
                image_width,
                image_height,
            )
        } else {
            None
        };

        let landmarks = pixels
            .into_iter()
            .map(|(x, y, z)| Point3::new(x / image_width as f32, y / image_height as f32, z))
            .collect();
        let handedness = if handedness > 0.5 {
            Handedness::Right
        } else {
            Handedness::Left
        };

        Ok(vec![NormalizedHand::new(landmarks, presence, handedness)])
    }
}
