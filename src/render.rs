//! Drawing the particle store onto a host surface.
//!
//! The [`Renderer`] never touches physics state. Each frame it clears the
//! surface, draws frozen and settled snow as one [`Layer::Piled`] batch, then
//! the falling flakes as a [`Layer::Falling`] batch. Particles reach the
//! surface as plain [`ParticleInstance`] records, laid out so a GPU surface
//! can upload them as an instance buffer without conversion.

use bytemuck::{Pod, Zeroable};

use crate::overlay::OverlayStats;
use crate::store::ParticleStore;
use crate::visuals::{Layer, LayerStyle, SnowStyle};

/// One circle to draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub radius: f32,
    pub _pad: f32,
}

impl ParticleInstance {
    #[inline]
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            position: [x, y],
            radius,
            _pad: 0.0,
        }
    }
}

/// A drawable target supplied by the host.
///
/// Coordinates are viewport pixels with the origin at the top-left corner and
/// y growing downward.
pub trait SnowSurface {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Start a new frame with an empty (transparent) surface.
    fn clear(&mut self);

    /// Draw a batch of circles with one style.
    fn draw_particles(&mut self, layer: Layer, particles: &[ParticleInstance], style: &LayerStyle);

    /// Show performance numbers. Surfaces without a text facility may ignore it.
    fn draw_overlay(&mut self, _stats: &OverlayStats) {}

    /// Finish the frame.
    fn present(&mut self) {}
}

impl<S: SnowSurface + ?Sized> SnowSurface for Box<S> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn draw_particles(&mut self, layer: Layer, particles: &[ParticleInstance], style: &LayerStyle) {
        (**self).draw_particles(layer, particles, style)
    }

    fn draw_overlay(&mut self, stats: &OverlayStats) {
        (**self).draw_overlay(stats)
    }

    fn present(&mut self) {
        (**self).present()
    }
}

/// Builds instance batches from the store and submits them.
///
/// Owns only scratch buffers, reused between frames.
#[derive(Debug, Default)]
pub struct Renderer {
    piled: Vec<ParticleInstance>,
    falling: Vec<ParticleInstance>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one frame.
    pub fn draw<S: SnowSurface + ?Sized>(
        &mut self,
        store: &ParticleStore,
        style: &SnowStyle,
        overlay: Option<&OverlayStats>,
        surface: &mut S,
    ) {
        self.piled.clear();
        self.piled.extend(store.frozen().iter().map(|f| {
            let p = f.position();
            ParticleInstance::new(p.x, p.y, f.radius())
        }));
        self.piled.extend(store.settled().iter().map(|s| {
            let p = s.position();
            ParticleInstance::new(p.x, p.y, s.radius())
        }));

        self.falling.clear();
        self.falling.extend(
            store
                .active()
                .iter()
                .map(|a| ParticleInstance::new(a.position.x, a.position.y, a.radius())),
        );

        surface.clear();
        if !self.piled.is_empty() {
            surface.draw_particles(Layer::Piled, &self.piled, &style.layer(Layer::Piled));
        }
        if !self.falling.is_empty() {
            surface.draw_particles(Layer::Falling, &self.falling, &style.layer(Layer::Falling));
        }
        if let Some(stats) = overlay {
            surface.draw_overlay(stats);
        }
        surface.present();
    }
}
