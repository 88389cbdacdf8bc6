//! Webcam hand tracking demo.
//!
//! Environment variables:
//! - `HANDTRACKING_CAMERA`: camera index (default 0)
//! - `HANDTRACKING_MODEL_DIR`: directory holding `hand_landmark_full.onnx` (default `models`)
//! - `HANDTRACKING_FONT`: TTF used for the FPS counter; common system fonts are tried otherwise
//! - `RUST_LOG`: log filter, e.g. `RUST_LOG=debug`

mod app;
mod utils;
mod webcam;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use rusttype::Font;

use handtracking::hand::LandmarkIdx;
use handtracking::{overlay, HandDetector, HandDetectorConfig};

use crate::app::HandtrackingApp;
use crate::utils::{lock, FpsCounter, FrameFailures, SharedState, State};
use crate::webcam::Camera;

const FRAME_WIDTH: u32 = 1280;
const FRAME_HEIGHT: u32 = 720;
const FRAME_RATE: u32 = 30;
const MAX_FRAME_FAILURES: u32 = 30;
const FRAME_RETRY_DELAY: Duration = Duration::from_millis(50);

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Settings of the demo, read from the environment.
struct DemoConfig {
    camera: usize,
    model_dir: PathBuf,
    font: Option<PathBuf>,
}

impl DemoConfig {
    fn from_env() -> Self {
        let camera = std::env::var("HANDTRACKING_CAMERA")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        let model_dir = std::env::var_os("HANDTRACKING_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("models"));
        let font = std::env::var_os("HANDTRACKING_FONT").map(PathBuf::from);

        Self {
            camera,
            model_dir,
            font,
        }
    }
}

/// The configured font, or else the first of `candidates` that exists.
fn font_path(configured: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

fn load_fps_font(config: &DemoConfig) -> Option<Font<'static>> {
    let Some(path) = font_path(config.font.as_deref(), SYSTEM_FONTS) else {
        log::warn!("FPS counter disabled: no font found, set HANDTRACKING_FONT");
        return None;
    };
    match overlay::load_font(&path) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("FPS counter disabled: {:#}", e);
            None
        }
    }
}

// captures frames, runs the detector and publishes the annotated frame
fn run_worker(shared_state: &SharedState, config: &DemoConfig) -> Result<()> {
    let mut camera = Camera::open(config.camera, FRAME_WIDTH, FRAME_HEIGHT, FRAME_RATE)?;
    lock(shared_state).resolution = Some(camera.resolution());

    let mut detector = HandDetector::mediapipe(HandDetectorConfig::default(), &config.model_dir)?;
    let font = load_fps_font(config);
    let mut fps = FpsCounter::new(10);
    let mut failures = FrameFailures::new(MAX_FRAME_FAILURES, FRAME_RETRY_DELAY);

    loop {
        let mut image = match camera.frame() {
            Ok(image) => {
                failures.succeeded();
                image
            }
            Err(e) => {
                std::thread::sleep(failures.failed(e)?);
                continue;
            }
        };

        let hands = detector.find_hands(&mut image, true)?;
        let position = detector.find_position(&mut image, 0, true)?;

        let mut thumb_tip = None;
        let mut fingers = None;
        if let Some(position) = &position {
            let lm = position.landmarks.landmark(LandmarkIdx::ThumbTip)?;
            println!("[{}, {}, {}]", lm.id, lm.x, lm.y);
            thumb_tip = Some(lm);
            fingers = Some(detector.fingers_up()?);
        }

        let rate = fps.tick(Instant::now());
        if let Some(font) = &font {
            overlay::draw_fps(&mut image, rate, font, detector.style());
        }

        let mut state = lock(shared_state);
        state.fps = Some(rate);
        state.image = Some(image);
        state.hands = hands;
        state.thumb_tip = thumb_tip;
        state.fingers = fingers;
        state.error = None;
    }
}

fn worker_thread(shared_state: SharedState, config: DemoConfig) {
    loop {
        if let Err(e) = run_worker(&shared_state, &config) {
            log::error!("{:#}", e);
            lock(&shared_state).error = Some(format!("{:#}", e));
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = DemoConfig::from_env();
    let shared_state: SharedState = Arc::new(Mutex::new(State::default()));

    let worker_state = Arc::clone(&shared_state);
    std::thread::spawn(move || worker_thread(worker_state, config));

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Hand Tracking",
        native_options,
        Box::new(|cc| Box::new(HandtrackingApp::new(cc, shared_state))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_font_wins() {
        let path = font_path(Some(Path::new("/fonts/custom.ttf")), &[]);
        assert_eq!(path, Some(PathBuf::from("/fonts/custom.ttf")));
    }

    #[test]
    fn first_existing_candidate_is_used() {
        let existing = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        let path = font_path(None, &["/nonexistent/font.ttf", existing]);
        assert_eq!(path, Some(PathBuf::from(existing)));
        assert_eq!(font_path(None, &["/nonexistent/font.ttf"]), None);
    }
}
