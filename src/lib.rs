//! # Snowfall
//!
//! A 2D snow particle simulation with piling and freezing, driven by a fixed
//! timestep and drawn onto a host-supplied surface.
//!
//! Flakes fall under gravity, sway, and drift with a pointer-controlled wind.
//! When a flake comes to rest on the floor, or in a notch between two resting
//! flakes, it *settles* and its slot immediately respawns above the viewport.
//! Settled snow that stays still long enough *freezes* into static terrain.
//!
//! ## Quick Start
//!
//! ```ignore
//! use snowfall::prelude::*;
//!
//! let config = SnowConfig::new().with_max_particles(500).with_seed(7);
//! let mut effect = SnowEffect::new(config, 640.0, 360.0);
//! effect.attach_surface(ImageSurface::new(640, 360));
//! effect.start();
//!
//! for frame in 0..600 {
//!     effect.on_tick(frame as f64 * 16.0);
//! }
//! effect.surface().unwrap().save_png("snow.png")?;
//! ```
//!
//! ## Core Concepts
//!
//! ### Populations
//!
//! The [`ParticleStore`](store::ParticleStore) keeps three populations:
//!
//! - **active** - falling flakes, a fixed-size set whose slots are recycled
//! - **settled** - resting flakes that still push falling ones around
//! - **frozen** - resting flakes that stopped moving; permanent until reset
//!
//! Particles only ever move Active → Settled → Frozen. A radius never changes.
//!
//! ### The loop
//!
//! The host calls [`SnowEffect::on_tick`] once per display refresh with a
//! monotonic timestamp. Elapsed time is clamped, accumulated and split into
//! fixed physics ticks (capped per callback), then a frame is drawn if the
//! render throttle allows.
//!
//! ### Surfaces
//!
//! Anything implementing [`SnowSurface`] can be drawn on. The crate ships an
//! [`ImageSurface`] (CPU, PNG export) and a [`GpuSurface`] (wgpu, window).
//!
//! ## Logging
//!
//! The crate logs through [`tracing`]; install a subscriber to see it.

pub mod config;
pub mod effect;
pub mod error;
mod gpu;
pub mod input;
pub mod overlay;
pub mod physics;
pub mod render;
pub mod snapshot;
pub mod spatial;
pub mod store;
pub mod time;
pub mod visuals;
pub mod window;

pub use bytemuck;
pub use config::SnowConfig;
pub use effect::{FrameStats, SnowEffect};
pub use error::{GpuError, SnowError};
pub use glam::Vec2;
pub use gpu::GpuSurface;
pub use overlay::OverlayStats;
pub use render::{ParticleInstance, SnowSurface};
pub use snapshot::ImageSurface;
pub use visuals::{Layer, LayerStyle, Rgba, SnowStyle};

/// Convenient re-exports for hosts.
///
/// ```ignore
/// use snowfall::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::SnowConfig;
    pub use crate::effect::{FrameStats, SnowEffect};
    pub use crate::error::SnowError;
    pub use crate::gpu::GpuSurface;
    pub use crate::overlay::OverlayStats;
    pub use crate::render::{ParticleInstance, SnowSurface};
    pub use crate::snapshot::ImageSurface;
    pub use crate::visuals::{Layer, LayerStyle, Rgba, SnowStyle};
}
