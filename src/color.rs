//! Color type shared by cell descriptors, configuration and render surfaces.
//!
//! Colors serialize as `#RRGGBB` strings so a JSON [`GridConfig`](crate::config::GridConfig)
//! stays readable.

use serde::{Deserialize, Serialize};

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to CSS hex string (#RRGGBB).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Lighten the color by blending with white.
    /// Factor of 0.0 = no change, 1.0 = pure white.
    pub fn lighten(self, factor: f64) -> Self {
        Self {
            r: Self::blend_component(self.r, 255, factor),
            g: Self::blend_component(self.g, 255, factor),
            b: Self::blend_component(self.b, 255, factor),
        }
    }

    /// Darken the color by blending with black.
    /// Factor of 0.0 = no change, 1.0 = pure black.
    pub fn darken(self, factor: f64) -> Self {
        Self {
            r: Self::blend_component(self.r, 0, factor),
            g: Self::blend_component(self.g, 0, factor),
            b: Self::blend_component(self.b, 0, factor),
        }
    }

    /// The cast is safe because we clamp to [0, 255] before converting.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn blend_component(from: u8, to: u8, factor: f64) -> u8 {
        let from = f64::from(from);
        let to = f64::from(to);
        let blended = from + (to - from) * factor.clamp(0.0, 1.0);
        blended.clamp(0.0, 255.0).round() as u8
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s).ok_or_else(|| format!("invalid color {s:?}, expected #RRGGBB"))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

/// Default grid colors.
pub mod palette {
    use super::Rgb;

    pub const BACKGROUND: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const ALTERNATE_BACKGROUND: Rgb = Rgb::new(0xF8, 0xF8, 0xF8);
    pub const GRID_LINE: Rgb = Rgb::new(0xDA, 0xDC, 0xE0);
    pub const CELL_FONT: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const HEADER_BACKGROUND: Rgb = Rgb::new(0xF3, 0xF3, 0xF3);
    pub const HEADER_CURRENT_BACKGROUND: Rgb = Rgb::new(0xCF, 0xD8, 0xE8);
    pub const SELECTED: Rgb = Rgb::new(0x33, 0x99, 0xFF);
    pub const SELECTED_TEXT: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const MOUSE_OVER_ROW: Rgb = Rgb::new(0xE5, 0xF1, 0xFB);
    pub const ACTIVE_REGION_FRAME: Rgb = Rgb::new(0xA0, 0xA0, 0xA0);
    pub const ACTIVE_REGION_HOVER_FILL: Rgb = Rgb::new(0xDC, 0xDC, 0xDC);
    pub const DECORATION: Rgb = Rgb::new(0x00, 0x00, 0x00);
    pub const REORDER_INDICATOR: Rgb = Rgb::new(0x1E, 0x6F, 0xD9);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Rgb::from_hex("#3399FF").unwrap();
        assert_eq!(c, Rgb::new(0x33, 0x99, 0xFF));
        assert_eq!(c.to_hex(), "#3399FF");
        assert_eq!(Rgb::from_hex("3399ff"), Some(c));
        assert_eq!(Rgb::from_hex("#39F"), None);
    }

    #[test]
    fn test_lighten_darken_extremes() {
        let c = Rgb::new(100, 100, 100);
        assert_eq!(c.lighten(1.0), Rgb::new(255, 255, 255));
        assert_eq!(c.darken(1.0), Rgb::new(0, 0, 0));
        assert_eq!(c.lighten(0.0), c);
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&palette::SELECTED).unwrap();
        assert_eq!(json, "\"#3399FF\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, palette::SELECTED);
        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }
}
