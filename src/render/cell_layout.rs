//! Placement of a cell's blocks inside its content rect.
//!
//! Layout is pure: it turns a descriptor into positioned text lines, images
//! and active regions, and the renderer turns those into surface calls.
//! Auto-sizing reuses the same measurements so a sized column fits what is
//! drawn.

use crate::color::Rgb;
use crate::render::measure::{TextMeasureCache, TextMeasurer};
use crate::types::{
    Alignment, BlockContent, CellBlock, CellDescriptor, FontSpec, IntPoint, IntRect, IntSize,
    MouseHoverBehaviour,
};

/// Clickable rectangle produced by a block with a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRegion {
    pub rect: IntRect,
    pub command: String,
    pub tooltip: Option<String>,
    /// Whether the frame is drawn around the region
    pub show_frame: bool,
    /// Whether the pointer is inside the region
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacedContent {
    Text {
        /// Top-left origin and text of each line
        lines: Vec<(IntPoint, String)>,
        font: FontSpec,
        color: Option<Rgb>,
    },
    Image {
        dest: IntPoint,
        source: String,
        size: IntSize,
    },
}

/// A block ready to draw. Hidden blocks are not placed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedBlock {
    pub content: PlacedContent,
    pub region: Option<ActiveRegion>,
}

/// Result of laying out one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellLayout {
    pub content_rect: IntRect,
    pub blocks: Vec<PlacedBlock>,
    /// The left and right block cursors crossed
    pub trimmed: bool,
}

impl CellLayout {
    pub fn active_regions(&self) -> impl Iterator<Item = &ActiveRegion> {
        self.blocks.iter().filter_map(|b| b.region.as_ref())
    }
}

/// Inputs shared by every cell of a pass.
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams<'a> {
    pub font: &'a FontSpec,
    pub padding_horizontal: i32,
    pub padding_vertical: i32,
    pub block_padding: i32,
    pub line_height: i32,
}

/// Pointer state relevant to one cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverState {
    pub is_hover_cell: bool,
    pub pointer: Option<IntPoint>,
}

struct Measurer<'a, 'b> {
    measurer: &'a dyn TextMeasurer,
    cache: &'b mut TextMeasureCache,
}

impl Measurer<'_, '_> {
    fn block_size(&mut self, base: &FontSpec, block: &CellBlock) -> (i32, i32) {
        match &block.content {
            BlockContent::Text { text, bold, italic, .. } => {
                let font = base.styled(*bold, *italic);
                (
                    self.cache.text_width(self.measurer, &font, text),
                    self.measurer.text_height(&font, text),
                )
            }
            BlockContent::Image { width, height, .. } => (*width, *height),
        }
    }
}

fn start_position(alignment: Alignment, left: i32, right: i32, width: i32, offset_x: i32) -> i32 {
    let start = match alignment {
        Alignment::Left => left,
        Alignment::Center => left + (right - left - width) / 2,
        Alignment::Right => right - width,
    };
    start + offset_x
}

/// Round half away from zero of `(outer - inner) / 2`, as used for
/// vertical centering.
fn centered_offset(outer: i32, inner: i32) -> i32 {
    let twice = outer - inner;
    if twice >= 0 {
        (twice + 1) / 2
    } else {
        (twice - 1) / 2
    }
}

/// Place one block inside `left..right`. Returns its width.
#[allow(clippy::too_many_arguments)]
fn place_block(
    m: &mut Measurer<'_, '_>,
    params: &LayoutParams<'_>,
    hover: HoverState,
    content: IntRect,
    block: &CellBlock,
    alignment: Alignment,
    left: i32,
    right: i32,
    out: &mut Vec<PlacedBlock>,
) -> i32 {
    let (width, height) = m.block_size(params.font, block);
    let visible = block.hover != MouseHoverBehaviour::HideWhenMouseOut || hover.is_hover_cell;
    if !visible {
        return width;
    }
    let top = content.top + centered_offset(content.height, height);
    let start = start_position(alignment, left, right, width, block.offset_x);

    let region = block.command.as_ref().map(|command| {
        let rect = IntRect::from_xywh(start, top, width, height).grow_symmetrical(1, 1);
        ActiveRegion {
            rect,
            command: command.clone(),
            tooltip: block.tooltip.clone(),
            show_frame: block.hover != MouseHoverBehaviour::HideButtonWhenMouseOut || hover.is_hover_cell,
            hovered: hover.pointer.is_some_and(|p| rect.contains(p)),
        }
    });

    let placed = match &block.content {
        BlockContent::Text { text, bold, italic, color } => {
            let font = params.font.styled(*bold, *italic);
            let mut line_top = top;
            let mut lines = Vec::new();
            for line in text.split('\n') {
                let w = m.cache.line_width(m.measurer, &font, line);
                lines.push((
                    IntPoint::new(start_position(alignment, left, right, w, block.offset_x), line_top),
                    line.to_string(),
                ));
                line_top += params.line_height;
            }
            PlacedContent::Text {
                lines,
                font,
                color: *color,
            }
        }
        BlockContent::Image { source, width, height } => PlacedContent::Image {
            dest: IntPoint::new(start, top),
            source: source.clone(),
            size: IntSize::new(*width, *height),
        },
    };
    out.push(PlacedBlock { content: placed, region });
    width
}

/// Lay out `descriptor` inside the cell rect `rect`.
///
/// Right-aligned blocks are placed from the right edge inward first; the
/// remaining blocks then fill from the left while space remains. The cell
/// is trimmed when the left cursor passes the right one.
pub fn layout_cell(
    descriptor: &CellDescriptor,
    rect: IntRect,
    params: &LayoutParams<'_>,
    hover: HoverState,
    measurer: &dyn TextMeasurer,
    cache: &mut TextMeasureCache,
) -> CellLayout {
    let content = rect.grow_symmetrical(-params.padding_horizontal, -params.padding_vertical);
    let mut m = Measurer { measurer, cache };
    let mut blocks = Vec::new();

    let left_count = descriptor.left_block_count();
    let mut left_pos = content.left;
    let mut right_pos = content.right();

    for (i, block) in descriptor.blocks.iter().enumerate().skip(left_count).rev() {
        if i + 1 < descriptor.blocks.len() {
            right_pos -= params.block_padding;
        }
        let width = place_block(
            &mut m,
            params,
            hover,
            content,
            block,
            Alignment::Right,
            left_pos,
            right_pos,
            &mut blocks,
        );
        right_pos -= width;
    }

    for (i, block) in descriptor.blocks.iter().take(left_count).enumerate() {
        if left_pos >= right_pos {
            break;
        }
        if i > 0 {
            left_pos += params.block_padding;
        }
        let alignment = match block.content {
            BlockContent::Image { .. } => block.alignment,
            BlockContent::Text { .. } => descriptor.alignment,
        };
        left_pos += place_block(
            &mut m,
            params,
            hover,
            content,
            block,
            alignment,
            left_pos,
            right_pos,
            &mut blocks,
        );
    }

    CellLayout {
        content_rect: content,
        blocks,
        trimmed: left_pos > right_pos,
    }
}

/// Width the blocks of `descriptor` need, gaps included, padding excluded.
pub fn content_width(
    descriptor: &CellDescriptor,
    font: &FontSpec,
    block_padding: i32,
    measurer: &dyn TextMeasurer,
    cache: &mut TextMeasureCache,
) -> i32 {
    let mut m = Measurer { measurer, cache };
    descriptor
        .blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let gap = if i > 0 { block_padding } else { 0 };
            gap + m.block_size(font, block).0
        })
        .sum()
}

/// Height of the tallest text block, at least one line.
pub fn content_height(descriptor: &CellDescriptor, font: &FontSpec, measurer: &dyn TextMeasurer) -> i32 {
    descriptor
        .blocks
        .iter()
        .filter_map(|block| match &block.content {
            BlockContent::Text { text, bold, italic, .. } => {
                Some(measurer.text_height(&font.styled(*bold, *italic), text))
            }
            BlockContent::Image { .. } => None,
        })
        .fold(measurer.line_height(font), i32::max)
}
