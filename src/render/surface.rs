//! Render surface abstraction.
//!
//! The renderer only ever talks to a `RenderSurface`, so the same draw pass
//! runs against a browser canvas or a headless recorder.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::Result;
use crate::types::{FontSpec, IntPoint, IntRect};

/// Optional treatment of source pixels during an image blit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlitOptions {
    /// Source pixels of exactly this color are skipped
    pub key_color: Option<Rgb>,
    /// Constant opacity in `0.0..=1.0`
    pub alpha: Option<f32>,
}

impl BlitOptions {
    pub fn keyed(color: Rgb) -> Self {
        Self {
            key_color: Some(color),
            alpha: None,
        }
    }

    pub fn with_alpha(alpha: f32) -> Self {
        Self {
            key_color: None,
            alpha: Some(alpha.clamp(0.0, 1.0)),
        }
    }
}

/// Drawing primitives the grid renderer needs.
///
/// Implementations handle the actual pixel operations for a backend.
/// Coordinates are surface pixels with the origin at the top left.
pub trait RenderSurface {
    /// Surface width in pixels
    fn width(&self) -> i32;

    /// Surface height in pixels
    fn height(&self) -> i32;

    /// Adapt the backing store to a new size. Contents are undefined after.
    fn resize(&mut self, width: i32, height: i32) -> Result<()>;

    /// Fill the whole surface.
    fn clear(&mut self, color: Rgb);

    fn fill_rect(&mut self, rect: IntRect, color: Rgb);

    /// One pixel outline along the inside of `rect`.
    fn draw_rect(&mut self, rect: IntRect, color: Rgb);

    fn draw_line(&mut self, from: IntPoint, to: IntPoint, color: Rgb);

    /// Draw one line of text with its top-left corner at `origin`, clipped
    /// to `clip`.
    fn draw_text(&mut self, origin: IntPoint, clip: IntRect, color: Rgb, font: &FontSpec, text: &str);

    /// Copy `src` of the image named `source` to `dest`.
    fn blit_image(&mut self, dest: IntPoint, source: &str, src: IntRect, options: BlitOptions) -> Result<()>;

    /// Shift the pixels inside `region` by `(dx, dy)`. Pixels shifted out are
    /// discarded; the exposed strip keeps stale content until redrawn.
    fn scroll_pixels(&mut self, dx: i32, dy: i32, region: IntRect) -> Result<()>;

    /// Called once after every render pass.
    fn present(&mut self) -> Result<()> {
        Ok(())
    }
}
