//! Text measurement.
//!
//! Block placement and column auto-sizing both need text extents. The
//! measurer itself is stateless; results go through a [`TextMeasureCache`]
//! owned by the engine.

use crate::render::cache::LruCache;
use crate::types::FontSpec;

/// Measures single lines of text.
pub trait TextMeasurer {
    /// Advance width of one line in pixels.
    fn text_width(&self, font: &FontSpec, text: &str) -> i32;

    /// Height of one line in pixels.
    fn line_height(&self, font: &FontSpec) -> i32;

    /// Height of possibly multi-line text.
    fn text_height(&self, font: &FontSpec, text: &str) -> i32 {
        let lines = i32::try_from(text.split('\n').count()).unwrap_or(i32::MAX);
        self.line_height(font).saturating_mul(lines.max(1))
    }
}

/// Monospace approximation for headless use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthMeasurer {
    pub char_width: i32,
    /// Extra width per character for bold text
    pub bold_extra: i32,
}

impl Default for FixedWidthMeasurer {
    fn default() -> Self {
        Self {
            char_width: 7,
            bold_extra: 1,
        }
    }
}

impl FixedWidthMeasurer {
    pub fn new(char_width: i32) -> Self {
        Self {
            char_width,
            bold_extra: 0,
        }
    }
}

impl TextMeasurer for FixedWidthMeasurer {
    fn text_width(&self, font: &FontSpec, text: &str) -> i32 {
        let per_char = if font.bold {
            self.char_width + self.bold_extra
        } else {
            self.char_width
        };
        let chars = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        chars.saturating_mul(per_char)
    }

    fn line_height(&self, font: &FontSpec) -> i32 {
        i32::try_from(font.size).unwrap_or(12).saturating_add(3)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    font: FontSpec,
    text: String,
}

/// Per-engine cache of text widths.
#[derive(Debug, Clone)]
pub struct TextMeasureCache {
    widths: LruCache<MeasureKey, i32>,
}

impl TextMeasureCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            widths: LruCache::new(capacity),
        }
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.widths.set_capacity(capacity);
    }

    pub fn capacity(&self) -> usize {
        self.widths.capacity()
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub fn stats(&self) -> (u64, u64) {
        self.widths.stats()
    }

    pub fn clear(&mut self) {
        self.widths.clear();
    }

    /// Width of one line through the cache.
    pub fn line_width(&mut self, measurer: &dyn TextMeasurer, font: &FontSpec, text: &str) -> i32 {
        let key = MeasureKey {
            font: font.clone(),
            text: text.to_string(),
        };
        self.widths.get_or_insert_with(&key, || measurer.text_width(font, text))
    }

    /// Widest line of `text`.
    pub fn text_width(&mut self, measurer: &dyn TextMeasurer, font: &FontSpec, text: &str) -> i32 {
        text.split('\n')
            .map(|line| self.line_width(measurer, font, line))
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width() {
        let m = FixedWidthMeasurer::default();
        let font = FontSpec::default();
        assert_eq!(m.text_width(&font, "abcd"), 28);
        assert_eq!(m.text_width(&font.styled(true, false), "abcd"), 32);
        assert_eq!(m.line_height(&font), 15);
        assert_eq!(m.text_height(&font, "a\nb"), 30);
    }

    #[test]
    fn test_cache_measures_once() {
        let m = FixedWidthMeasurer::new(5);
        let font = FontSpec::default();
        let mut cache = TextMeasureCache::new(16);
        assert_eq!(cache.text_width(&m, &font, "ab\nabcd"), 20);
        assert_eq!(cache.text_width(&m, &font, "abcd"), 20);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats(), (1, 2));
        cache.clear();
        assert!(cache.is_empty());
    }
}
