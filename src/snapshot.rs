//! CPU rasterizer for headless rendering.
//!
//! [`ImageSurface`] implements [`SnowSurface`] on a plain pixel buffer, so
//! the effect can run without a window or GPU and the result can be written
//! out as a PNG.
//!
//! ```ignore
//! let mut effect = SnowEffect::new(SnowConfig::default(), 640.0, 360.0);
//! effect.attach_surface(ImageSurface::new(640, 360));
//! effect.start();
//! // ... on_tick a few hundred times ...
//! effect.surface().unwrap().save_png("snow.png")?;
//! ```

use std::path::Path;

use image::RgbaImage;

use crate::error::SnowError;
use crate::overlay::OverlayStats;
use crate::render::{ParticleInstance, SnowSurface};
use crate::visuals::{Layer, LayerStyle, Rgba};

/// Pixel buffer with premultiplied-alpha "source over" blending.
#[derive(Debug, Clone)]
pub struct ImageSurface {
    width: u32,
    height: u32,
    background: Rgba,
    pixels: Vec<[f32; 4]>,
    last_overlay: Option<OverlayStats>,
    frames: u64,
}

impl ImageSurface {
    /// Transparent surface of the given size (floored to 1x1).
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self {
            width,
            height,
            background: Rgba::TRANSPARENT,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
            last_overlay: None,
            frames: 0,
        }
    }

    /// Fill color used by [`clear`](SnowSurface::clear).
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background.clamped();
        self.fill_background();
        self
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Overlay stats of the latest frame that had the overlay visible.
    pub fn last_overlay(&self) -> Option<&OverlayStats> {
        self.last_overlay.as_ref()
    }

    /// Straight-alpha color of one pixel, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpremultiply(self.pixels[self.offset(x, y)]))
    }

    /// Convert to an 8-bit RGBA image.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let Rgba(c) = unpremultiply(self.pixels[self.offset(x, y)]);
            image::Rgba(c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
        })
    }

    /// Write the current contents as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), SnowError> {
        self.to_image()
            .save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        Ok(())
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn fill_background(&mut self) {
        let bg = premultiply(self.background);
        self.pixels.fill(bg);
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba, coverage: f32) {
        let a = color.alpha() * coverage;
        if a <= 0.0 {
            return;
        }
        let i = self.offset(x, y);
        let dst = &mut self.pixels[i];
        let Rgba([r, g, b, _]) = color;
        let keep = 1.0 - a;
        dst[0] = r * a + dst[0] * keep;
        dst[1] = g * a + dst[1] * keep;
        dst[2] = b * a + dst[2] * keep;
        dst[3] = a + dst[3] * keep;
    }

    /// Anti-aliased disc plus an optional halo fading out over `blur` pixels.
    fn draw_circle(&mut self, center: [f32; 2], radius: f32, fill: Rgba, shadow: Rgba, blur: f32) {
        if !(center[0].is_finite() && center[1].is_finite() && radius > 0.0) {
            return;
        }
        let halo = if shadow.alpha() > 0.0 { blur.max(0.0) } else { 0.0 };
        let reach = radius + halo + 1.0;
        let x0 = (center[0] - reach).floor().max(0.0) as u32;
        let y0 = (center[1] - reach).floor().max(0.0) as u32;
        let x1 = ((center[0] + reach).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((center[1] + reach).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - center[0];
                let dy = y as f32 + 0.5 - center[1];
                let d = (dx * dx + dy * dy).sqrt();

                if halo > 0.0 && d < radius + halo {
                    let t = 1.0 - ((d - radius).max(0.0) / halo);
                    self.blend(x, y, shadow, t * t);
                }
                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, fill, coverage);
                }
            }
        }
    }
}

impl SnowSurface for ImageSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.fill_background();
    }

    fn draw_particles(&mut self, _layer: Layer, particles: &[ParticleInstance], style: &LayerStyle) {
        let fill = style.fill.clamped();
        let shadow = style.shadow.clamped();
        for p in particles {
            self.draw_circle(p.position, p.radius, fill, shadow, style.shadow_blur);
        }
    }

    fn draw_overlay(&mut self, stats: &OverlayStats) {
        self.last_overlay = Some(*stats);
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}

fn premultiply(Rgba([r, g, b, a]): Rgba) -> [f32; 4] {
    [r * a, g * a, b * a, a]
}

fn unpremultiply([r, g, b, a]: [f32; 4]) -> Rgba {
    if a <= f32::EPSILON {
        Rgba::TRANSPARENT
    } else {
        Rgba::new(r / a, g / a, b / a, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(fill: Rgba) -> LayerStyle {
        LayerStyle {
            fill,
            shadow: Rgba::TRANSPARENT,
            shadow_blur: 0.0,
        }
    }

    #[test]
    fn test_circle_covers_center_only() {
        let mut surface = ImageSurface::new(20, 20);
        let red = Rgba::new(1.0, 0.0, 0.0, 1.0);
        surface.draw_particles(Layer::Falling, &[ParticleInstance::new(10.0, 10.0, 3.0)], &style(red));

        let center = surface.pixel(10, 10).unwrap();
        assert!((center.0[0] - 1.0).abs() < 1e-5);
        assert!((center.alpha() - 1.0).abs() < 1e-5);
        assert_eq!(surface.pixel(0, 0).unwrap(), Rgba::TRANSPARENT);
        assert!(surface.pixel(20, 0).is_none());
    }

    #[test]
    fn test_halo_extends_past_radius() {
        let mut surface = ImageSurface::new(40, 40);
        let layer = LayerStyle {
            fill: Rgba::WHITE,
            shadow: Rgba::new(0.0, 0.0, 1.0, 1.0),
            shadow_blur: 6.0,
        };
        surface.draw_particles(Layer::Falling, &[ParticleInstance::new(20.0, 20.0, 2.0)], &layer);
        // 4.5 px from the center: outside the disc, inside the halo.
        let glow = surface.pixel(24, 19).unwrap();
        assert!(glow.alpha() > 0.0);
        assert!(glow.0[2] > glow.0[0]);
    }

    #[test]
    fn test_clear_restores_background() {
        let bg = Rgba::new(0.0, 0.0, 0.2, 1.0);
        let mut surface = ImageSurface::new(8, 8).with_background(bg);
        surface.draw_particles(Layer::Piled, &[ParticleInstance::new(4.0, 4.0, 2.0)], &style(Rgba::WHITE));
        assert_ne!(surface.pixel(4, 4), Some(bg));
        surface.clear();
        let px = surface.pixel(4, 4).unwrap();
        assert!((px.0[2] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_offscreen_particles_are_skipped() {
        let mut surface = ImageSurface::new(8, 8);
        surface.draw_particles(
            Layer::Falling,
            &[
                ParticleInstance::new(-50.0, -50.0, 3.0),
                ParticleInstance::new(f32::NAN, 2.0, 3.0),
            ],
            &style(Rgba::WHITE),
        );
        assert!((0..8).all(|x| surface.pixel(x, 0) == Some(Rgba::TRANSPARENT)));
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snow.png");
        let mut surface = ImageSurface::new(16, 12);
        surface.draw_particles(Layer::Falling, &[ParticleInstance::new(8.0, 6.0, 2.5)], &style(Rgba::WHITE));
        surface.save_png(&path).unwrap();

        let decoded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (16, 12));
        assert_eq!(decoded.get_pixel(8, 6).0, [255, 255, 255, 255]);
    }
}
