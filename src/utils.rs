use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{bail, Error, Result};
use image::RgbImage;

use handtracking::{FingerState, Landmark};

// make SharedState an alias for a Mutex protected struct State
pub type SharedState = Arc<Mutex<State>>;

/// Data handed from the capture thread to the viewer.
#[derive(Default)]
pub struct State {
    pub fps: Option<f32>,
    pub resolution: Option<(u32, u32)>,
    /// Latest annotated frame.
    pub image: Option<RgbImage>,
    pub hands: usize,
    pub thumb_tip: Option<Landmark>,
    pub fingers: Option<FingerState>,
    pub error: Option<String>,
}

/// Locks the shared state, carrying on with the data if the other thread panicked.
pub fn lock(state: &SharedState) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frame rate averaged over the last few frame intervals.
pub struct FpsCounter {
    last_frame: Option<Instant>,
    fps_vec: VecDeque<f32>,
    max_length: usize,
}

impl FpsCounter {
    pub fn new(max_length: usize) -> Self {
        Self {
            last_frame: None,
            fps_vec: VecDeque::with_capacity(max_length),
            max_length: max_length.max(1),
        }
    }

    /// Records a frame finished at `now` and returns the mean rate, 0 until two frames were seen.
    pub fn tick(&mut self, now: Instant) -> f32 {
        if let Some(last) = self.last_frame.replace(now) {
            let delta = now.saturating_duration_since(last).as_secs_f32();
            if delta > 0.0 {
                self.fps_vec.push_back(1.0 / delta);
                if self.fps_vec.len() > self.max_length {
                    self.fps_vec.pop_front();
                }
            }
        }
        self.mean()
    }

    pub fn mean(&self) -> f32 {
        if self.fps_vec.is_empty() {
            return 0.0;
        }
        self.fps_vec.iter().sum::<f32>() / self.fps_vec.len() as f32
    }
}

/// Counts consecutive frame read failures and decides when to give up on the camera.
pub struct FrameFailures {
    count: u32,
    limit: u32,
    backoff: Duration,
}

impl FrameFailures {
    pub fn new(limit: u32, backoff: Duration) -> Self {
        Self {
            count: 0,
            limit: limit.max(1),
            backoff,
        }
    }

    /// Records a failed read. Returns how long to wait before the next read, or an error once
    /// `limit` reads in a row have failed.
    pub fn failed(&mut self, error: Error) -> Result<Duration> {
        self.count += 1;
        if self.count >= self.limit {
            bail!("{} frame reads failed in a row, last: {:#}", self.count, error);
        }
        log::warn!("{:#}", error);
        Ok(self.backoff)
    }

    pub fn succeeded(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_frame_has_no_rate() {
        let mut fps = FpsCounter::new(10);
        assert_eq!(fps.tick(Instant::now()), 0.0);
    }

    #[test]
    fn averages_recent_intervals() {
        let mut fps = FpsCounter::new(2);
        let start = Instant::now();
        fps.tick(start);
        fps.tick(start + Duration::from_millis(100));
        let rate = fps.tick(start + Duration::from_millis(150));
        // (10 + 20) / 2
        assert!((rate - 15.0).abs() < 1e-3);

        let rate = fps.tick(start + Duration::from_millis(200));
        // oldest interval dropped: (20 + 20) / 2
        assert!((rate - 20.0).abs() < 1e-3);
    }

    #[test]
    fn frame_failures_back_off_then_give_up() {
        let mut failures = FrameFailures::new(3, Duration::from_millis(20));
        assert_eq!(
            failures.failed(anyhow::anyhow!("timeout")).unwrap(),
            Duration::from_millis(20)
        );
        assert!(failures.failed(anyhow::anyhow!("timeout")).is_ok());

        let err = failures.failed(anyhow::anyhow!("unplugged")).unwrap_err();
        assert!(err.to_string().contains("3 frame reads failed"));
        assert!(err.to_string().contains("unplugged"));
    }

    #[test]
    fn a_good_frame_resets_the_failure_count() {
        let mut failures = FrameFailures::new(2, Duration::ZERO);
        assert!(failures.failed(anyhow::anyhow!("timeout")).is_ok());
        failures.succeeded();
        assert!(failures.failed(anyhow::anyhow!("timeout")).is_ok());
    }

    #[test]
    fn repeated_timestamps_are_ignored() {
        let mut fps = FpsCounter::new(4);
        let start = Instant::now();
        fps.tick(start);
        fps.tick(start);
        assert_eq!(fps.mean(), 0.0);
    }
}
