//! Display description of one cell, as supplied by a content provider.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Horizontal placement of a block inside the span left free by its
/// neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Line decoration drawn over a cell after its blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellDecoration {
    #[default]
    None,
    /// Horizontal line across the vertical middle of the cell
    StrikeOutHorizontal,
}

/// When a cell tooltip is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TooltipVisibility {
    /// Whenever the pointer rests on the cell
    Always,
    /// Only when the cell content did not fit
    #[default]
    OnlyWhenTrimmed,
}

/// Block visibility relative to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseHoverBehaviour {
    #[default]
    ShowAll,
    /// Block is drawn only while the pointer is over its cell
    HideWhenMouseOut,
    /// Block is drawn, but its command frame only while hovered
    HideButtonWhenMouseOut,
}

/// Content of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockContent {
    Text {
        text: String,
        bold: bool,
        italic: bool,
        color: Option<Rgb>,
    },
    Image {
        /// Key the render surface resolves to pixels
        source: String,
        width: i32,
        height: i32,
    },
}

/// One laid-out unit inside a cell: a run of text or an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBlock {
    pub content: BlockContent,
    /// Alignment used for image blocks; text follows the cell alignment
    pub alignment: Alignment,
    pub offset_x: i32,
    /// Clicking the block sends this parameter to the provider
    pub command: Option<String>,
    pub tooltip: Option<String>,
    pub hover: MouseHoverBehaviour,
}

impl CellBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_content(BlockContent::Text {
            text: text.into(),
            bold: false,
            italic: false,
            color: None,
        })
    }

    pub fn image(source: impl Into<String>, width: i32, height: i32) -> Self {
        Self::from_content(BlockContent::Image {
            source: source.into(),
            width: width.max(0),
            height: height.max(0),
        })
    }

    fn from_content(content: BlockContent) -> Self {
        Self {
            content,
            alignment: Alignment::Left,
            offset_x: 0,
            command: None,
            tooltip: None,
            hover: MouseHoverBehaviour::ShowAll,
        }
    }

    pub fn bold(mut self) -> Self {
        if let BlockContent::Text { bold, .. } = &mut self.content {
            *bold = true;
        }
        self
    }

    pub fn italic(mut self) -> Self {
        if let BlockContent::Text { italic, .. } = &mut self.content {
            *italic = true;
        }
        self
    }

    pub fn with_color(mut self, c: Rgb) -> Self {
        if let BlockContent::Text { color, .. } = &mut self.content {
            *color = Some(c);
        }
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_hover(mut self, hover: MouseHoverBehaviour) -> Self {
        self.hover = hover;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_offset_x(mut self, offset_x: i32) -> Self {
        self.offset_x = offset_x;
        self
    }

    /// Text of a text block.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Text { text, .. } => Some(text),
            BlockContent::Image { .. } => None,
        }
    }
}

/// Everything the renderer needs to draw one cell or header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDescriptor {
    pub background: Option<Rgb>,
    /// Blocks in display order; the last `right_aligned_blocks` of them are
    /// laid out from the right edge
    pub blocks: Vec<CellBlock>,
    pub right_aligned_blocks: usize,
    pub alignment: Alignment,
    pub decoration: CellDecoration,
    pub decoration_color: Option<Rgb>,
    pub tooltip: Option<String>,
    pub tooltip_visibility: TooltipVisibility,
}

impl CellDescriptor {
    /// An empty cell.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A cell holding one plain text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![CellBlock::text(text)],
            ..Self::default()
        }
    }

    pub fn with_block(mut self, block: CellBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Append a block laid out from the right edge.
    pub fn with_right_block(mut self, block: CellBlock) -> Self {
        self.blocks.push(block);
        self.right_aligned_blocks += 1;
        self
    }

    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_decoration(mut self, decoration: CellDecoration, color: Option<Rgb>) -> Self {
        self.decoration = decoration;
        self.decoration_color = color;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>, visibility: TooltipVisibility) -> Self {
        self.tooltip = Some(tooltip.into());
        self.tooltip_visibility = visibility;
        self
    }

    /// Number of blocks laid out from the left edge.
    pub fn left_block_count(&self) -> usize {
        self.blocks.len().saturating_sub(self.right_aligned_blocks)
    }

    /// Plain text of the cell, text blocks joined by a space.
    pub fn plain_text(&self) -> String {
        let parts: Vec<&str> = self.blocks.iter().filter_map(CellBlock::as_text).collect();
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let d = CellDescriptor::text("abc")
            .with_right_block(CellBlock::image("icon", 16, 16).with_command("open"))
            .with_decoration(CellDecoration::StrikeOutHorizontal, None);
        assert_eq!(d.blocks.len(), 2);
        assert_eq!(d.right_aligned_blocks, 1);
        assert_eq!(d.left_block_count(), 1);
        assert_eq!(d.plain_text(), "abc");
        assert_eq!(d.blocks.get(1).and_then(|b| b.command.as_deref()), Some("open"));
    }

    #[test]
    fn test_style_builders_ignore_images() {
        let b = CellBlock::image("x", 4, 4).bold().with_color(Rgb::new(1, 2, 3));
        assert_eq!(b.content, BlockContent::Image { source: "x".into(), width: 4, height: 4 });
    }

    #[test]
    fn test_right_count_larger_than_blocks() {
        let d = CellDescriptor {
            right_aligned_blocks: 5,
            ..CellDescriptor::text("a")
        };
        assert_eq!(d.left_block_count(), 0);
    }
}
