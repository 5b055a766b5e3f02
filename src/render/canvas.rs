//! Canvas 2D surface.
//!
//! Implements [`RenderSurface`] over an `HtmlCanvasElement` via web-sys.
//! Scrolling copies the canvas onto itself, so a one-line scroll costs one
//! image copy plus the exposed strip.

use std::collections::HashMap;

use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::color::Rgb;
use crate::error::{GridError, Result};
use crate::render::measure::TextMeasurer;
use crate::render::surface::{BlitOptions, RenderSurface};
use crate::types::{FontSpec, IntPoint, IntRect};

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|_| GridError::Surface("Failed to get 2d context".into()))?
        .ok_or_else(|| GridError::Surface("No 2d context available".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| GridError::Surface("Failed to cast to CanvasRenderingContext2d".into()))
}

/// Helper to get crisp pixel position for 1px lines
fn crisp(x: i32) -> f64 {
    f64::from(x) + 0.5
}

fn u32_size(v: i32) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(0)
}

fn i32_size(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Canvas-backed render surface.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    /// Images blitted by key, registered by the host
    images: HashMap<String, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx = context_2d(&canvas)?;
        ctx.set_text_baseline("top");
        Ok(Self {
            canvas,
            ctx,
            images: HashMap::new(),
        })
    }

    /// Measurer sharing this surface's context.
    pub fn measurer(&self) -> CanvasTextMeasurer {
        CanvasTextMeasurer {
            ctx: self.ctx.clone(),
        }
    }

    pub fn register_image(&mut self, key: impl Into<String>, image: HtmlImageElement) {
        self.images.insert(key.into(), image);
    }

    pub fn remove_image(&mut self, key: &str) {
        self.images.remove(key);
    }
}

impl RenderSurface for CanvasSurface {
    fn width(&self) -> i32 {
        i32_size(self.canvas.width())
    }

    fn height(&self) -> i32 {
        i32_size(self.canvas.height())
    }

    fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        self.canvas.set_width(u32_size(width));
        self.canvas.set_height(u32_size(height));
        // Resizing resets context state.
        self.ctx.set_text_baseline("top");
        Ok(())
    }

    fn clear(&mut self, color: Rgb) {
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ctx.fill_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }

    fn fill_rect(&mut self, rect: IntRect, color: Rgb) {
        if rect.is_empty() {
            return;
        }
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ctx.fill_rect(
            f64::from(rect.left),
            f64::from(rect.top),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    fn draw_rect(&mut self, rect: IntRect, color: Rgb) {
        if rect.is_empty() {
            return;
        }
        self.ctx.set_stroke_style_str(&color.to_hex());
        self.ctx.set_line_width(1.0);
        self.ctx.stroke_rect(
            crisp(rect.left),
            crisp(rect.top),
            f64::from(rect.width - 1),
            f64::from(rect.height - 1),
        );
    }

    fn draw_line(&mut self, from: IntPoint, to: IntPoint, color: Rgb) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&color.to_hex());
        self.ctx.set_line_width(1.0);
        self.ctx.move_to(crisp(from.x), crisp(from.y));
        self.ctx.line_to(crisp(to.x), crisp(to.y));
        self.ctx.stroke();
    }

    fn draw_text(&mut self, origin: IntPoint, clip: IntRect, color: Rgb, font: &FontSpec, text: &str) {
        if clip.is_empty() || text.is_empty() {
            return;
        }
        self.ctx.save();
        self.ctx.begin_path();
        self.ctx.rect(
            f64::from(clip.left),
            f64::from(clip.top),
            f64::from(clip.width),
            f64::from(clip.height),
        );
        self.ctx.clip();
        self.ctx.set_font(&font.to_css());
        self.ctx.set_fill_style_str(&color.to_hex());
        if let Err(e) = self.ctx.fill_text(text, f64::from(origin.x), f64::from(origin.y)) {
            warn!(target: "gridview::render", error = ?e, "fill_text failed");
        }
        self.ctx.restore();
    }

    fn blit_image(&mut self, dest: IntPoint, source: &str, src: IntRect, options: BlitOptions) -> Result<()> {
        let image = self
            .images
            .get(source)
            .ok_or_else(|| GridError::Surface(format!("image {source:?} is not registered")))?;
        if let Some(alpha) = options.alpha {
            self.ctx.set_global_alpha(f64::from(alpha));
        }
        let drawn = self
            .ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                f64::from(src.left),
                f64::from(src.top),
                f64::from(src.width),
                f64::from(src.height),
                f64::from(dest.x),
                f64::from(dest.y),
                f64::from(src.width),
                f64::from(src.height),
            );
        self.ctx.set_global_alpha(1.0);
        drawn.map_err(|_| GridError::Surface(format!("drawing image {source:?} failed")))
    }

    fn scroll_pixels(&mut self, dx: i32, dy: i32, region: IntRect) -> Result<()> {
        if region.is_empty() || (dx == 0 && dy == 0) {
            return Ok(());
        }
        // Source part that stays inside the region after the shift.
        let src_left = region.left + (-dx).max(0);
        let src_top = region.top + (-dy).max(0);
        let width = region.width - dx.abs();
        let height = region.height - dy.abs();
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        self.ctx
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                &self.canvas,
                f64::from(src_left),
                f64::from(src_top),
                f64::from(width),
                f64::from(height),
                f64::from(src_left + dx),
                f64::from(src_top + dy),
                f64::from(width),
                f64::from(height),
            )
            .map_err(|_| GridError::Surface("canvas self-copy failed".into()))
    }
}

/// Text measurer backed by the canvas `measureText`.
#[derive(Clone)]
pub struct CanvasTextMeasurer {
    ctx: CanvasRenderingContext2d,
}

impl TextMeasurer for CanvasTextMeasurer {
    #[allow(clippy::cast_possible_truncation)]
    fn text_width(&self, font: &FontSpec, text: &str) -> i32 {
        self.ctx.set_font(&font.to_css());
        let width = self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
        width.ceil().clamp(0.0, f64::from(i32::MAX)) as i32
    }

    fn line_height(&self, font: &FontSpec) -> i32 {
        i32::try_from(font.size).unwrap_or(12).saturating_add(3)
    }
}
