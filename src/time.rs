//! Timing for the fixed-timestep loop.
//!
//! The host hands in a monotonic timestamp in milliseconds on every callback.
//! [`FixedTimestep`] turns the gaps between callbacks into a whole number of
//! fixed physics ticks, [`RenderThrottle`] decides whether this callback also
//! draws, and [`FrameRate`] keeps a smoothed FPS for the overlay.
//!
//! # Example
//!
//! ```ignore
//! use snowfall::time::FixedTimestep;
//!
//! let mut clock = FixedTimestep::new(1000.0 / 60.0, 1000.0, 5);
//!
//! // In the host's animation callback:
//! let plan = clock.advance(now_ms);
//! for _ in 0..plan.steps {
//!     physics_tick();
//! }
//! ```

/// Result of feeding one callback timestamp to a [`FixedTimestep`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepPlan {
    /// Wall time since the previous callback after clamping, in ms.
    pub elapsed_ms: f32,
    /// Physics ticks to run now.
    pub steps: u32,
    /// The step cap was reached and leftover time was dropped.
    pub capped: bool,
}

/// Accumulator that converts variable callback gaps into fixed ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step_ms: f32,
    max_frame_ms: f32,
    max_steps: u32,
    accumulator: f32,
    last_ms: Option<f64>,
}

impl FixedTimestep {
    pub fn new(step_ms: f32, max_frame_ms: f32, max_steps: u32) -> Self {
        Self {
            step_ms: step_ms.max(f32::EPSILON),
            max_frame_ms: max_frame_ms.max(0.0),
            max_steps: max_steps.max(1),
            accumulator: 0.0,
            last_ms: None,
        }
    }

    /// Account for a callback at `now_ms` and plan the ticks to run.
    ///
    /// The first callback after construction or [`reset`](Self::reset) only
    /// records the timestamp. Gaps are clamped to `max_frame_ms`. Timestamps
    /// that are not finite or earlier than the last one count as zero and are
    /// not kept. When the step cap is hit the accumulator is cut down to a
    /// single tick, so a long stall shows up as a slowdown rather than a later
    /// burst of catch-up ticks.
    pub fn advance(&mut self, now_ms: f64) -> StepPlan {
        let elapsed = match self.last_ms {
            _ if !now_ms.is_finite() => 0.0,
            Some(last) if now_ms < last => 0.0,
            Some(last) => {
                self.last_ms = Some(now_ms);
                ((now_ms - last) as f32).min(self.max_frame_ms)
            }
            None => {
                self.last_ms = Some(now_ms);
                0.0
            }
        };
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator >= self.step_ms && steps < self.max_steps {
            self.accumulator -= self.step_ms;
            steps += 1;
        }

        let capped = steps == self.max_steps && self.accumulator > self.step_ms;
        if capped {
            self.accumulator = self.step_ms;
        }

        StepPlan {
            elapsed_ms: elapsed,
            steps,
            capped,
        }
    }

    /// Forget the last timestamp and any buffered time.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_ms = None;
    }

    /// Buffered time not yet consumed by ticks.
    #[inline]
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    #[inline]
    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    #[inline]
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }
}

/// Caps how often the loop renders.
#[derive(Debug, Clone)]
pub struct RenderThrottle {
    min_interval_ms: f32,
    last_render_ms: Option<f64>,
}

impl RenderThrottle {
    pub fn new(max_fps: f32) -> Self {
        Self {
            min_interval_ms: 1000.0 / max_fps.max(f32::EPSILON),
            last_render_ms: None,
        }
    }

    /// Whether a frame should be drawn at `now_ms`. Records the render when
    /// it returns `true`. Non-finite and backwards timestamps never render.
    pub fn should_render(&mut self, now_ms: f64) -> bool {
        if !now_ms.is_finite() {
            return false;
        }
        let due = match self.last_render_ms {
            None => true,
            Some(last) => now_ms - last >= self.min_interval_ms as f64,
        };
        if due {
            self.last_render_ms = Some(now_ms);
        }
        due
    }

    pub fn reset(&mut self) {
        self.last_render_ms = None;
    }

    #[inline]
    pub fn min_interval_ms(&self) -> f32 {
        self.min_interval_ms
    }
}

/// Exponentially smoothed frames-per-second.
#[derive(Debug, Clone, Default)]
pub struct FrameRate {
    fps: f32,
    last_ms: Option<f64>,
}

impl FrameRate {
    /// Weight of the newest sample.
    const SMOOTHING: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now_ms`.
    pub fn sample(&mut self, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            return self.fps;
        }
        if let Some(last) = self.last_ms {
            let dt = (now_ms - last) as f32;
            if dt <= 0.0 {
                return self.fps;
            }
            let instant = 1000.0 / dt;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                self.fps + (instant - self.fps) * Self::SMOOTHING
            };
        }
        self.last_ms = Some(now_ms);
        self.fps
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_callback_runs_nothing() {
        let mut clock = FixedTimestep::new(10.0, 1000.0, 5);
        let plan = clock.advance(12345.0);
        assert_eq!(plan.steps, 0);
        assert_eq!(plan.elapsed_ms, 0.0);
    }

    #[test]
    fn test_accumulates_partial_ticks() {
        let mut clock = FixedTimestep::new(10.0, 1000.0, 5);
        clock.advance(0.0);
        assert_eq!(clock.advance(6.0).steps, 0);
        assert_eq!(clock.advance(12.0).steps, 1);
        assert!((clock.accumulator() - 2.0).abs() < 1e-4);
        assert_eq!(clock.advance(32.0).steps, 2);
    }

    #[test]
    fn test_stall_is_clamped_and_capped() {
        let mut clock = FixedTimestep::new(1000.0 / 60.0, 1000.0, 5);
        clock.advance(0.0);
        let plan = clock.advance(5000.0);

        assert_eq!(plan.elapsed_ms, 1000.0);
        assert_eq!(plan.steps, 5);
        assert!(plan.capped);
        // Debt is dropped down to one tick.
        assert!((clock.accumulator() - clock.step_ms()).abs() < 1e-4);
    }

    #[test]
    fn test_backwards_clock_is_zero() {
        let mut clock = FixedTimestep::new(10.0, 1000.0, 5);
        clock.advance(100.0);
        let plan = clock.advance(50.0);
        assert_eq!(plan.elapsed_ms, 0.0);
        assert_eq!(plan.steps, 0);
    }

    #[test]
    fn test_bad_timestamps_are_not_kept() {
        let mut clock = FixedTimestep::new(1000.0 / 60.0, 1000.0, 5);
        clock.advance(0.0);
        for bad in [f64::NAN, -500.0, f64::INFINITY] {
            assert_eq!(clock.advance(bad), StepPlan::default());
        }
        let plan = clock.advance(100.0);
        assert_eq!(plan.elapsed_ms, 100.0);
        assert_eq!(plan.steps, 5);
    }

    #[test]
    fn test_backwards_clock_waits_for_last_time() {
        let mut clock = FixedTimestep::new(10.0, 1000.0, 5);
        clock.advance(100.0);
        clock.advance(50.0);
        assert_eq!(clock.advance(90.0).steps, 0);
        assert_eq!(clock.advance(120.0).elapsed_ms, 20.0);
    }

    #[test]
    fn test_reset_forgets_time() {
        let mut clock = FixedTimestep::new(10.0, 1000.0, 5);
        clock.advance(0.0);
        clock.advance(15.0);
        clock.reset();
        assert_eq!(clock.accumulator(), 0.0);
        assert_eq!(clock.advance(500.0).steps, 0);
    }

    #[test]
    fn test_render_throttle() {
        let mut throttle = RenderThrottle::new(50.0);
        assert_eq!(throttle.min_interval_ms(), 20.0);
        assert!(throttle.should_render(0.0));
        assert!(!throttle.should_render(10.0));
        assert!(throttle.should_render(20.0));
        assert!(!throttle.should_render(39.0));
        throttle.reset();
        assert!(throttle.should_render(39.0));
    }

    #[test]
    fn test_render_throttle_skips_bad_timestamps() {
        let mut throttle = RenderThrottle::new(50.0);
        assert!(!throttle.should_render(f64::NAN));
        assert!(throttle.should_render(0.0));
        assert!(!throttle.should_render(f64::INFINITY));
        assert!(!throttle.should_render(-500.0));
        assert!(throttle.should_render(20.0));
    }

    #[test]
    fn test_frame_rate_smoothing() {
        let mut rate = FrameRate::new();
        assert_eq!(rate.sample(0.0), 0.0);
        assert!((rate.sample(20.0) - 50.0).abs() < 1e-3);
        let next = rate.sample(30.0);
        assert!(next > 50.0 && next < 100.0);
    }
}
