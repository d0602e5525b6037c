//! Fixed-timestep pacing.
//!
//! The simulation advances in whole ticks. In realtime mode wall-clock time
//! is accumulated and converted into a tick count per loop iteration; in
//! headless mode the runner simply steps as fast as it can.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Most ticks run for one accumulated delta, to avoid a spiral of death.
const MAX_TICKS_PER_FRAME: u32 = 10;

/// Frame timing manager.
#[derive(Debug)]
pub struct FrameTiming {
    /// Seconds per tick
    fixed_dt: f32,
    /// Time budget per tick
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Unconsumed time
    accumulator: f32,
    /// Largest delta accepted in one call
    max_dt: f32,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(60)
    }
}

impl FrameTiming {
    /// Create a timing manager for a tick rate.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            fixed_dt: 1.0 / tick_rate as f32,
            frame_budget: Duration::from_secs_f64(1.0 / f64::from(tick_rate)),
            last_frame: Instant::now(),
            accumulator: 0.0,
            max_dt: 0.25,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Calculate delta time since last frame.
    /// Also stores the frame time for FPS calculation.
    pub fn delta_time(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        let clamped_dt = dt.min(self.max_dt);

        self.frame_times.push_back(clamped_dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }

        clamped_dt
    }

    /// Accumulate time and return how many ticks are due.
    pub fn accumulate(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;
        let mut count = 0;

        while self.accumulator >= self.fixed_dt && count < MAX_TICKS_PER_FRAME {
            self.accumulator -= self.fixed_dt;
            count += 1;
        }

        // Still behind: drop the backlog
        if self.accumulator > self.fixed_dt * 2.0 {
            self.accumulator = 0.0;
        }

        count
    }

    /// Sleep until the current tick's budget is used up.
    pub fn sleep_remainder(&self) {
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Ticks per second averaged over recent frames.
    #[must_use]
    pub fn current_rate(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let avg_frame_time: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;

        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }

    /// Reset timing (call after a pause between rounds).
    pub fn reset(&mut self) {
        self.last_frame = Instant::now();
        self.accumulator = 0.0;
        self.frame_times.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dt_from_rate() {
        let timing = FrameTiming::new(50);
        assert!((timing.fixed_dt - 0.02).abs() < 1e-6);
        assert_eq!(timing.frame_budget, Duration::from_millis(20));
        assert!((FrameTiming::new(0).fixed_dt - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_accumulate_counts_whole_ticks() {
        let mut timing = FrameTiming::new(10);
        assert_eq!(timing.accumulate(0.05), 0);
        assert_eq!(timing.accumulate(0.06), 1);
        assert_eq!(timing.accumulate(0.21), 2);
    }

    #[test]
    fn test_accumulate_caps_backlog() {
        let mut timing = FrameTiming::new(100);
        assert_eq!(timing.accumulate(0.5), MAX_TICKS_PER_FRAME);
        // Backlog beyond two ticks was discarded
        assert_eq!(timing.accumulate(0.0), 0);
    }

    #[test]
    fn test_rate_average() {
        let mut timing = FrameTiming::new(60);
        assert_eq!(timing.current_rate(), 0.0);
        timing.delta_time();
        timing.reset();
        assert_eq!(timing.current_rate(), 0.0);
    }
}
