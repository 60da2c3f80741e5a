//! Pointer-driven wind.
//!
//! Pointer events only move the wind *target*. The current wind value is
//! eased toward the target inside the physics tick, so the rate of input
//! events never changes how fast the simulation responds.
//!
//! ```ignore
//! // host: on pointer move
//! effect.pointer_move(x, y);
//! // physics: once per fixed tick
//! wind.ease(delta_ratio);
//! ```

/// Fraction of the remaining distance to the target covered per nominal tick.
pub const WIND_EASE: f32 = 0.05;

/// Smoothed wind scalar in `-1.0..=1.0` (negative blows left).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wind {
    target: f32,
    current: f32,
}

impl Wind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target from a pointer position.
    ///
    /// The left edge maps to `-1`, the center to `0` and the right edge to
    /// `1`. The vertical coordinate is ignored.
    pub fn pointer_move(&mut self, x: f32, _y: f32, width: f32) {
        if !x.is_finite() {
            return;
        }
        let ratio = (x / width.max(1.0)).clamp(0.0, 1.0);
        self.target = ratio * 2.0 - 1.0;
    }

    /// Set the target directly.
    pub fn set_target(&mut self, target: f32) {
        if target.is_finite() {
            self.target = target.clamp(-1.0, 1.0);
        }
    }

    /// Move the current value toward the target by one tick.
    #[inline]
    pub fn ease(&mut self, delta_ratio: f32) {
        let t = (WIND_EASE * delta_ratio).clamp(0.0, 1.0);
        self.current += (self.target - self.current) * t;
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Back to calm air.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_maps_horizontal_ratio() {
        let mut wind = Wind::new();
        wind.pointer_move(0.0, 10.0, 800.0);
        assert_eq!(wind.target(), -1.0);
        wind.pointer_move(400.0, 500.0, 800.0);
        assert_eq!(wind.target(), 0.0);
        wind.pointer_move(2000.0, 0.0, 800.0);
        assert_eq!(wind.target(), 1.0);
        // Input alone never moves the current value
        assert_eq!(wind.current(), 0.0);
    }

    #[test]
    fn test_ease_converges() {
        let mut wind = Wind::new();
        wind.set_target(1.0);
        wind.ease(1.0);
        assert!((wind.current() - WIND_EASE).abs() < 1e-6);
        for _ in 0..500 {
            wind.ease(1.0);
        }
        assert!((wind.current() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_non_finite_input_ignored() {
        let mut wind = Wind::new();
        wind.set_target(0.5);
        wind.set_target(f32::NAN);
        wind.pointer_move(f32::INFINITY, 0.0, 100.0);
        assert_eq!(wind.target(), 0.5);
        wind.set_target(7.0);
        assert_eq!(wind.target(), 1.0);
    }
}
