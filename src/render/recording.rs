//! Headless surface that records draw calls.
//!
//! Used by the CLI, benchmarks and tests to inspect exactly what a render
//! pass emitted.

use serde::Serialize;

use crate::color::Rgb;
use crate::error::Result;
use crate::render::surface::{BlitOptions, RenderSurface};
use crate::types::{FontSpec, IntPoint, IntRect};

/// One recorded surface call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Clear(Rgb),
    FillRect {
        rect: IntRect,
        color: Rgb,
    },
    DrawRect {
        rect: IntRect,
        color: Rgb,
    },
    Line {
        from: IntPoint,
        to: IntPoint,
        color: Rgb,
    },
    Text {
        origin: IntPoint,
        clip: IntRect,
        color: Rgb,
        font: FontSpec,
        text: String,
    },
    Image {
        dest: IntPoint,
        source: String,
        src: IntRect,
        options: BlitOptions,
    },
    ScrollPixels {
        dx: i32,
        dy: i32,
        region: IntRect,
    },
    Present,
}

/// A surface that keeps every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: i32,
    height: i32,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drain the recorded calls.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Text strings drawn, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn scroll_ops(&self) -> Vec<(i32, i32, IntRect)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::ScrollPixels { dx, dy, region } => Some((*dx, *dy, *region)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Clear(_))).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        self.width = width.max(0);
        self.height = height.max(0);
        Ok(())
    }

    fn clear(&mut self, color: Rgb) {
        self.ops.push(DrawOp::Clear(color));
    }

    fn fill_rect(&mut self, rect: IntRect, color: Rgb) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn draw_rect(&mut self, rect: IntRect, color: Rgb) {
        self.ops.push(DrawOp::DrawRect { rect, color });
    }

    fn draw_line(&mut self, from: IntPoint, to: IntPoint, color: Rgb) {
        self.ops.push(DrawOp::Line { from, to, color });
    }

    fn draw_text(&mut self, origin: IntPoint, clip: IntRect, color: Rgb, font: &FontSpec, text: &str) {
        self.ops.push(DrawOp::Text {
            origin,
            clip,
            color,
            font: font.clone(),
            text: text.to_string(),
        });
    }

    fn blit_image(&mut self, dest: IntPoint, source: &str, src: IntRect, options: BlitOptions) -> Result<()> {
        self.ops.push(DrawOp::Image {
            dest,
            source: source.to_string(),
            src,
            options,
        });
        Ok(())
    }

    fn scroll_pixels(&mut self, dx: i32, dy: i32, region: IntRect) -> Result<()> {
        self.ops.push(DrawOp::ScrollPixels { dx, dy, region });
        Ok(())
    }

    fn present(&mut self) -> Result<()> {
        self.ops.push(DrawOp::Present);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut s = RecordingSurface::new(100, 50);
        s.clear(Rgb::new(255, 255, 255));
        s.draw_text(
            IntPoint::new(1, 2),
            IntRect::from_xywh(0, 0, 10, 10),
            Rgb::default(),
            &FontSpec::default(),
            "hi",
        );
        s.scroll_pixels(0, -20, IntRect::from_xywh(0, 0, 100, 50)).unwrap();
        assert_eq!(s.ops().len(), 3);
        assert_eq!(s.texts(), vec!["hi"]);
        assert_eq!(s.scroll_ops(), vec![(0, -20, IntRect::from_xywh(0, 0, 100, 50))]);
        assert_eq!(s.clear_count(), 1);
        assert_eq!(s.take_ops().len(), 3);
        assert!(s.ops().is_empty());
    }

    #[test]
    fn test_resize_clamps_negative() {
        let mut s = RecordingSurface::new(10, 10);
        s.resize(-5, 30).unwrap();
        assert_eq!((s.width(), s.height()), (0, 30));
    }
}
