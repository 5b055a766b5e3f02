use serde::{Deserialize, Serialize};

/// Font request passed to text measurement and drawing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    /// Size in pixels
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size: size.max(1),
            bold: false,
            italic: false,
        }
    }

    /// Same family and size with the given style.
    pub fn styled(&self, bold: bool, italic: bool) -> Self {
        Self {
            bold,
            italic,
            ..self.clone()
        }
    }

    /// CSS `font` shorthand, e.g. `italic bold 12px Segoe UI`.
    pub fn to_css(&self) -> String {
        let mut css = String::new();
        if self.italic {
            css.push_str("italic ");
        }
        if self.bold {
            css.push_str("bold ");
        }
        css.push_str(&format!("{}px {}", self.size, self.family));
        css
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Segoe UI", 12)
    }
}
