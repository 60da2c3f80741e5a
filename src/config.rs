//! Simulation configuration.
//!
//! Every field has a default, so a JSON file only needs the values it wants
//! to change:
//!
//! ```ignore
//! use snowfall::SnowConfig;
//!
//! let config = SnowConfig::from_json_str(r#"{ "max_particles": 800, "seed": 7 }"#)?;
//! let config = SnowConfig::new()
//!     .with_max_particles(800)
//!     .with_relaxation_passes(3)
//!     .with_seed(7);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SnowError;
use crate::visuals::SnowStyle;

/// Nominal length of one physics tick in milliseconds (60 Hz).
pub const NOMINAL_STEP_MS: f32 = 1000.0 / 60.0;

/// Tunable parameters of a [`SnowEffect`](crate::SnowEffect).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    /// Size of the active (falling) population.
    pub max_particles: usize,
    /// Collision relaxation passes per tick.
    pub relaxation_passes: u32,
    /// Optional cap on settled particles; oldest are evicted first.
    pub max_settled: Option<usize>,
    /// Spatial grid columns.
    pub grid_cols: u32,
    /// Spatial grid rows.
    pub grid_rows: u32,
    /// Length of one physics tick in milliseconds.
    pub fixed_step_ms: f32,
    /// Upper bound on physics ticks run by a single `on_tick` call.
    pub max_steps_per_frame: u32,
    /// Wall-clock gap between callbacks is clamped to this many milliseconds.
    pub max_frame_ms: f32,
    /// Render rate cap.
    pub max_render_fps: f32,
    /// Stillness (simulated ms) after which a settled flake freezes.
    pub freeze_after_ms: f32,
    /// RNG seed. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Cosmetic parameters.
    pub style: SnowStyle,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            max_particles: 350,
            relaxation_passes: 2,
            max_settled: None,
            grid_cols: 48,
            grid_rows: 32,
            fixed_step_ms: NOMINAL_STEP_MS,
            max_steps_per_frame: 5,
            max_frame_ms: 1000.0,
            max_render_fps: 60.0,
            freeze_after_ms: 1500.0,
            seed: None,
            style: SnowStyle::default(),
        }
    }
}

impl SnowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SnowError> {
        let config: SnowConfig = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Read and parse a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SnowError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SnowError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp values that would stall or break the loop.
    ///
    /// Zero grid dimensions become 1, non-positive or non-finite timings fall
    /// back to their defaults, and at least one relaxation pass and one step
    /// per frame are kept.
    pub fn validated(mut self) -> Self {
        let defaults = SnowConfig::default();
        let positive = |v: f32, fallback: f32| if v.is_finite() && v > 0.0 { v } else { fallback };

        self.relaxation_passes = self.relaxation_passes.max(1);
        self.grid_cols = self.grid_cols.max(1);
        self.grid_rows = self.grid_rows.max(1);
        self.max_steps_per_frame = self.max_steps_per_frame.max(1);
        self.fixed_step_ms = positive(self.fixed_step_ms, defaults.fixed_step_ms);
        self.max_frame_ms = positive(self.max_frame_ms, defaults.max_frame_ms);
        self.max_render_fps = positive(self.max_render_fps, defaults.max_render_fps);
        self.freeze_after_ms = positive(self.freeze_after_ms, defaults.freeze_after_ms);
        self.style.shadow_blur = self.style.shadow_blur.max(0.0);
        self
    }

    /// Ratio of the configured tick to the nominal 60 Hz tick.
    pub fn delta_ratio(&self) -> f32 {
        self.fixed_step_ms / NOMINAL_STEP_MS
    }

    pub fn with_max_particles(mut self, count: usize) -> Self {
        self.max_particles = count;
        self
    }

    pub fn with_relaxation_passes(mut self, passes: u32) -> Self {
        self.relaxation_passes = passes.max(1);
        self
    }

    /// Cap the settled population; `None` leaves it unbounded.
    pub fn with_max_settled(mut self, cap: Option<usize>) -> Self {
        self.max_settled = cap;
        self
    }

    pub fn with_grid(mut self, cols: u32, rows: u32) -> Self {
        self.grid_cols = cols.max(1);
        self.grid_rows = rows.max(1);
        self
    }

    pub fn with_fixed_step_ms(mut self, step_ms: f32) -> Self {
        self.fixed_step_ms = step_ms;
        self
    }

    pub fn with_max_steps_per_frame(mut self, steps: u32) -> Self {
        self.max_steps_per_frame = steps.max(1);
        self
    }

    pub fn with_max_render_fps(mut self, fps: f32) -> Self {
        self.max_render_fps = fps;
        self
    }

    pub fn with_freeze_after_ms(mut self, ms: f32) -> Self {
        self.freeze_after_ms = ms;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_style(mut self, style: SnowStyle) -> Self {
        self.style = style;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_nominal() {
        let config = SnowConfig::default();
        assert!((config.delta_ratio() - 1.0).abs() < 1e-6);
        assert!(config.max_settled.is_none());
        assert_eq!(config.max_frame_ms, 1000.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SnowConfig::from_json_str(r#"{ "max_particles": 12, "seed": 3 }"#).unwrap();
        assert_eq!(config.max_particles, 12);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.grid_cols, SnowConfig::default().grid_cols);
    }

    #[test]
    fn test_json_round_trip_keeps_style() {
        let config = SnowConfig::new()
            .with_style(SnowStyle::default().tinted(0.2, 0.4, 0.6))
            .with_max_settled(Some(100));
        let json = config.to_json().unwrap();
        let back = SnowConfig::from_json_str(&json).unwrap();
        assert_eq!(back.max_settled, Some(100));
        assert_eq!(back.max_particles, config.max_particles);
        for (a, b) in back.style.color.0.iter().zip(config.style.color.0.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_validated_clamps_degenerate_values() {
        let config = SnowConfig {
            relaxation_passes: 0,
            grid_cols: 0,
            fixed_step_ms: -4.0,
            max_render_fps: f32::NAN,
            ..SnowConfig::default()
        }
        .validated();

        assert_eq!(config.relaxation_passes, 1);
        assert_eq!(config.grid_cols, 1);
        assert_eq!(config.fixed_step_ms, NOMINAL_STEP_MS);
        assert_eq!(config.max_render_fps, 60.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            SnowConfig::from_json_str("{ max_particles: }"),
            Err(SnowError::Config(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snow.json");
        std::fs::write(&path, r#"{ "freeze_after_ms": 250.0 }"#).unwrap();
        let config = SnowConfig::from_json_file(&path).unwrap();
        assert_eq!(config.freeze_after_ms, 250.0);

        let missing = SnowConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SnowError::Io(_))));
    }
}
