//! Cosmetic configuration for snow rendering.
//!
//! Nothing here affects physics. The renderer passes a [`LayerStyle`] to the
//! surface for each layer it draws; piled snow (settled and frozen) shares one
//! style, falling snow uses another.

use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);
    pub const TRANSPARENT: Rgba = Rgba([0.0, 0.0, 0.0, 0.0]);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    ///
    /// Returns `None` for anything else.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match digits.len() {
            3 => {
                let mut out = [1.0; 4];
                for (i, c) in digits.chars().enumerate() {
                    let v = c.to_digit(16)? as f32;
                    out[i] = (v * 17.0) / 255.0;
                }
                Some(Self(out))
            }
            6 | 8 => {
                let mut out = [1.0; 4];
                for i in 0..digits.len() / 2 {
                    out[i] = channel(digits.get(i * 2..i * 2 + 2)?)?;
                }
                Some(Self(out))
            }
            _ => None,
        }
    }

    /// Clamp every component into `0.0..=1.0`.
    pub fn clamped(self) -> Self {
        Self(self.0.map(|c| c.clamp(0.0, 1.0)))
    }

    pub fn alpha(&self) -> f32 {
        self.0[3]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Colors and shadow applied to the snow layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowStyle {
    /// Fill color of falling flakes.
    pub color: Rgba,
    /// Glow drawn around falling flakes.
    pub shadow_color: Rgba,
    /// Glow width in pixels. Zero disables the glow.
    pub shadow_blur: f32,
    /// Fill color of settled and frozen snow.
    pub pile_color: Rgba,
}

impl Default for SnowStyle {
    fn default() -> Self {
        Self {
            color: Rgba::new(1.0, 1.0, 1.0, 0.9),
            shadow_color: Rgba::new(0.78, 0.86, 1.0, 0.6),
            shadow_blur: 4.0,
            pile_color: Rgba::new(0.96, 0.97, 1.0, 1.0),
        }
    }
}

impl SnowStyle {
    /// Replace the RGB of both fill colors, keeping their alpha.
    pub fn tinted(self, r: f32, g: f32, b: f32) -> Self {
        let [r, g, b] = [r, g, b].map(|c| c.clamp(0.0, 1.0));
        Self {
            color: Rgba::new(r, g, b, self.color.alpha()),
            pile_color: Rgba::new(r, g, b, self.pile_color.alpha()),
            ..self
        }
    }

    /// Style for the given layer.
    pub fn layer(&self, layer: Layer) -> LayerStyle {
        match layer {
            Layer::Piled => LayerStyle {
                fill: self.pile_color,
                shadow: Rgba::TRANSPARENT,
                shadow_blur: 0.0,
            },
            Layer::Falling => LayerStyle {
                fill: self.color,
                shadow: self.shadow_color,
                shadow_blur: self.shadow_blur.max(0.0),
            },
        }
    }
}

/// Which group of particles a draw call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Settled and frozen snow.
    Piled,
    /// Active, falling flakes.
    Falling,
}

/// Resolved style for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    pub fill: Rgba,
    pub shadow: Rgba,
    pub shadow_blur: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_short_and_long() {
        let white = Rgba::from_hex("#fff").unwrap();
        assert_eq!(white, Rgba::WHITE);

        let blue = Rgba::from_hex("#0000ff80").unwrap();
        assert!(blue.0[0].abs() < 1e-6);
        assert!((blue.0[2] - 1.0).abs() < 1e-6);
        assert!((blue.alpha() - 128.0 / 255.0).abs() < 1e-6);

        assert!(Rgba::from_hex("#12345").is_none());
        assert!(Rgba::from_hex("#gggggg").is_none());
    }

    #[test]
    fn test_tint_keeps_alpha_and_clamps() {
        let style = SnowStyle::default().tinted(2.0, 0.5, -1.0);
        assert_eq!(style.color.0[0], 1.0);
        assert_eq!(style.color.0[2], 0.0);
        assert_eq!(style.color.alpha(), SnowStyle::default().color.alpha());
        assert_eq!(style.pile_color.0[1], 0.5);
        assert_eq!(style.shadow_color, SnowStyle::default().shadow_color);
    }

    #[test]
    fn test_piled_layer_has_no_shadow() {
        let style = SnowStyle::default();
        let piled = style.layer(Layer::Piled);
        assert_eq!(piled.fill, style.pile_color);
        assert_eq!(piled.shadow_blur, 0.0);
        let falling = style.layer(Layer::Falling);
        assert_eq!(falling.shadow_blur, style.shadow_blur);
    }
}
