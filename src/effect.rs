//! The snow effect: lifecycle, host input and the frame loop.
//!
//! [`SnowEffect`] ties everything together. The host owns the clock and the
//! drawing surface; it calls [`SnowEffect::on_tick`] once per display refresh
//! with a monotonic timestamp, forwards pointer and resize events, and stops
//! scheduling callbacks once [`SnowEffect::is_running`] turns false.
//!
//! # Example
//!
//! ```ignore
//! use snowfall::prelude::*;
//!
//! let mut effect = SnowEffect::new(SnowConfig::default(), 800.0, 600.0);
//! effect.attach_surface(ImageSurface::new(800, 600));
//! effect.start();
//!
//! let mut now = 0.0;
//! while now < 5_000.0 {
//!     effect.on_tick(now);
//!     now += 16.0;
//! }
//! ```

use tracing::{debug, info, trace, warn};

use crate::config::SnowConfig;
use crate::input::Wind;
use crate::overlay::PerfOverlay;
use crate::physics::{PhysicsStep, StepParams, StepReport};
use crate::render::{Renderer, SnowSurface};
use crate::spatial::{SpatialConfig, SpatialGrid};
use crate::store::ParticleStore;
use crate::time::{FixedTimestep, RenderThrottle};
use crate::visuals::SnowStyle;

/// Number of columns reported by [`SnowEffect::pile_bins`].
pub const PILE_BINS: usize = 64;

/// What one [`SnowEffect::on_tick`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Clamped time since the previous callback, in ms.
    pub elapsed_ms: f32,
    /// Physics ticks run.
    pub steps: u32,
    /// The per-callback step cap was hit.
    pub capped: bool,
    /// A frame was drawn.
    pub rendered: bool,
    /// Flakes that settled during these ticks.
    pub settled: usize,
    /// Flakes that froze during these ticks.
    pub frozen: usize,
}

/// Falling, piling and freezing snow drawn onto a host surface.
pub struct SnowEffect<S: SnowSurface> {
    config: SnowConfig,
    store: ParticleStore,
    grid: SpatialGrid,
    physics: PhysicsStep,
    wind: Wind,
    clock: FixedTimestep,
    throttle: RenderThrottle,
    renderer: Renderer,
    overlay: PerfOverlay,
    surface: Option<S>,
    running: bool,
    last_frame: FrameStats,
}

impl<S: SnowSurface> SnowEffect<S> {
    /// Create a stopped effect for a `width` x `height` viewport.
    pub fn new(config: SnowConfig, width: f32, height: f32) -> Self {
        let config = config.validated();
        let (width, height) = (clamp_dim(width), clamp_dim(height));
        let store = ParticleStore::new(config.max_particles, config.max_settled, width, height, config.seed);
        let grid = SpatialGrid::new(SpatialConfig::new(config.grid_cols, config.grid_rows), width, height);
        let clock = FixedTimestep::new(config.fixed_step_ms, config.max_frame_ms, config.max_steps_per_frame);
        let throttle = RenderThrottle::new(config.max_render_fps);

        Self {
            config,
            store,
            grid,
            physics: PhysicsStep::new(),
            wind: Wind::new(),
            clock,
            throttle,
            renderer: Renderer::new(),
            overlay: PerfOverlay::new(),
            surface: None,
            running: false,
            last_frame: FrameStats::default(),
        }
    }

    /// Hand over the drawing target. Returns the previous one, if any.
    pub fn attach_surface(&mut self, surface: S) -> Option<S> {
        self.surface.replace(surface)
    }

    /// Take the drawing target back. The effect stops.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.stop();
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Begin the effect.
    ///
    /// Does nothing if already running, or (with a warning) if no surface
    /// is attached.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        if self.surface.is_none() {
            warn!("start ignored: no surface attached");
            return;
        }
        self.reset_state();
        self.running = true;
        info!(
            particles = self.store.max_active(),
            width = self.store.width(),
            height = self.store.height(),
            "snow started"
        );
    }

    /// End the effect and drop every particle.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        if let Some(surface) = self.surface.as_mut() {
            surface.clear();
            surface.present();
        }
        self.store.clear();
        self.grid.clear();
        self.wind.reset();
        self.clock.reset();
        self.throttle.reset();
        self.last_frame = FrameStats::default();
        info!("snow stopped");
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Empty the piles and respawn the falling snow without changing
    /// whether the effect runs.
    pub fn reset(&mut self) {
        self.reset_state();
        info!("snow reset");
    }

    fn reset_state(&mut self) {
        self.store.reset();
        self.grid.clear();
        self.wind.reset();
        self.clock.reset();
        self.throttle.reset();
        self.last_frame = FrameStats::default();
    }

    /// Replace the colors used for drawing.
    pub fn configure(&mut self, style: SnowStyle) {
        let mut style = style;
        style.shadow_blur = style.shadow_blur.max(0.0);
        self.config.style = style;
    }

    /// Recolor the snow, keeping alpha. Components are clamped to `0..=1`.
    pub fn set_tint(&mut self, r: f32, g: f32, b: f32) {
        self.config.style = self.config.style.tinted(r, g, b);
    }

    pub fn style(&self) -> &SnowStyle {
        &self.config.style
    }

    pub fn config(&self) -> &SnowConfig {
        &self.config
    }

    /// Follow a viewport size change.
    ///
    /// Piles are dropped since they no longer line up with the floor, and
    /// falling flakes are scattered over the new area.
    pub fn resize(&mut self, width: f32, height: f32) {
        let (width, height) = (clamp_dim(width), clamp_dim(height));
        self.store.set_viewport(width, height);
        self.grid.resize(width, height);
        self.store.clear_piles();
        self.clock.reset();
        if self.running {
            self.store.scatter_active();
        }
        info!(width, height, "snow resized");
    }

    /// Steer the wind from a pointer position in viewport pixels.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.wind.pointer_move(x, y, self.store.width());
    }

    /// Set the wind target directly, `-1.0` (left) to `1.0` (right).
    pub fn pointer_wind(&mut self, target: f32) {
        self.wind.set_target(target);
    }

    /// Animation callback.
    ///
    /// Runs as many fixed physics ticks as the time since the last callback
    /// allows, then draws if the render throttle permits. Does nothing while
    /// stopped.
    pub fn on_tick(&mut self, now_ms: f64) -> FrameStats {
        if !self.running {
            return FrameStats::default();
        }

        let plan = self.clock.advance(now_ms);
        if plan.capped {
            debug!(
                elapsed_ms = plan.elapsed_ms,
                steps = plan.steps,
                "step cap reached, dropping accumulated time"
            );
        }

        let params = StepParams {
            delta_ratio: self.config.delta_ratio(),
            step_ms: self.clock.step_ms(),
            relaxation_passes: self.config.relaxation_passes,
            freeze_after_ms: self.config.freeze_after_ms,
        };
        let mut changes = StepReport::default();
        for _ in 0..plan.steps {
            let report = self.physics.step(&mut self.store, &mut self.grid, &mut self.wind, &params);
            changes.settled += report.settled;
            changes.frozen += report.frozen;
        }
        if changes != StepReport::default() {
            trace!(settled = changes.settled, frozen = changes.frozen, "piles grew");
        }

        let rendered = match self.surface.as_mut() {
            Some(surface) if self.throttle.should_render(now_ms) => {
                let stats = self.overlay.sample(
                    now_ms,
                    self.store.active().len(),
                    self.store.settled().len(),
                    self.store.frozen().len(),
                );
                self.renderer.draw(&self.store, &self.config.style, stats.as_ref(), surface);
                true
            }
            _ => false,
        };

        self.last_frame = FrameStats {
            elapsed_ms: plan.elapsed_ms,
            steps: plan.steps,
            capped: plan.capped,
            rendered,
            settled: changes.settled,
            frozen: changes.frozen,
        };
        self.last_frame
    }

    /// Draw the current state now, ignoring the render throttle.
    ///
    /// Returns `false` when no surface is attached.
    pub fn redraw(&mut self) -> bool {
        let Some(surface) = self.surface.as_mut() else {
            return false;
        };
        self.renderer.draw(&self.store, &self.config.style, None, surface);
        true
    }

    /// Result of the latest [`on_tick`](Self::on_tick).
    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    pub fn active_count(&self) -> usize {
        self.store.active().len()
    }

    /// Frozen flakes, which no longer take part in the simulation.
    pub fn inactive_count(&self) -> usize {
        self.store.frozen().len()
    }

    pub fn settled_count(&self) -> usize {
        self.store.settled().len()
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay.toggle()
    }

    pub fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay.set_visible(visible);
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay.visible()
    }

    /// Pile height per column, [`PILE_BINS`] columns across the viewport.
    pub fn pile_bins(&self) -> Vec<f32> {
        self.store.pile_profile(PILE_BINS)
    }

    pub fn wind(&self) -> &Wind {
        &self.wind
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }
}

fn clamp_dim(v: f32) -> f32 {
    if v.is_finite() {
        v.max(1.0)
    } else {
        1.0
    }
}
