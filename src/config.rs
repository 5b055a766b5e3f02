//! Engine configuration.
//!
//! `GridConfig` is plain data: changing a field has no effect until the
//! struct is handed to [`GridView::set_config`](crate::viewer::GridView::set_config),
//! which recomputes layout explicitly.

use serde::{Deserialize, Serialize};

use crate::color::{palette, Rgb};
use crate::error::{GridError, Result};
use crate::types::FontSpec;

/// Configuration for a grid view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width of the row header column in pixels
    pub header_width: i32,
    /// Height of the column header row in pixels
    pub header_height: i32,
    /// Default row height; `None` derives it from the font size
    pub row_height: Option<i32>,
    /// Default column width; `None` uses four row heights
    pub column_width: Option<i32>,
    pub min_column_width: i32,
    pub max_column_width: Option<i32>,
    /// Widest the row header can be dragged
    pub max_header_width: i32,
    pub cell_padding_horizontal: i32,
    pub cell_padding_vertical: i32,
    /// Gap between adjacent blocks in a cell
    pub block_padding: i32,
    /// Vertical step between lines of multi-line text
    pub line_height: i32,
    /// Extra height added when measuring flexible rows
    pub row_height_reserve: i32,
    /// Distance in pixels from a column edge that starts a resize
    pub column_resize_threshold: i32,
    /// Pointer travel before a column-header press becomes a reorder drag
    pub reorder_drag_distance: i32,
    /// Dirty cells beyond this count promote to a full repaint
    pub invalidation_threshold: usize,

    pub can_select: bool,
    pub allow_select_all: bool,
    pub allow_escape_to_deselect: bool,
    pub allow_flexible_rows: bool,
    pub enable_mouse_hover_cell_background: bool,
    pub enable_horizontal_scroll: bool,
    pub enable_vertical_scroll: bool,

    pub font: FontSpec,
    pub colors: GridColors,

    /// Entries kept by the text measurement cache
    pub text_cache_capacity: usize,
    /// Delay before the overlay of a finished column drag is removed
    pub overlay_detach_delay_ms: u64,
    /// Delay before a tooltip is shown
    pub tooltip_delay_ms: u64,
    /// Auto-scroll period while dragging past the scroll area
    pub drag_scroll_interval_ms: u64,
}

/// Colors used by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridColors {
    pub background: Rgb,
    /// Background of odd rows; `None` disables alternation
    pub alternate_background: Option<Rgb>,
    pub grid_line: Rgb,
    pub cell_font: Rgb,
    pub header_background: Rgb,
    pub header_current_background: Rgb,
    pub selected: Rgb,
    pub selected_text: Rgb,
    pub mouse_over_row: Rgb,
    pub active_region_frame: Rgb,
    pub active_region_hover_fill: Rgb,
    pub reorder_indicator: Rgb,
}

impl Default for GridColors {
    fn default() -> Self {
        Self {
            background: palette::BACKGROUND,
            alternate_background: Some(palette::ALTERNATE_BACKGROUND),
            grid_line: palette::GRID_LINE,
            cell_font: palette::CELL_FONT,
            header_background: palette::HEADER_BACKGROUND,
            header_current_background: palette::HEADER_CURRENT_BACKGROUND,
            selected: palette::SELECTED,
            selected_text: palette::SELECTED_TEXT,
            mouse_over_row: palette::MOUSE_OVER_ROW,
            active_region_frame: palette::ACTIVE_REGION_FRAME,
            active_region_hover_fill: palette::ACTIVE_REGION_HOVER_FILL,
            reorder_indicator: palette::REORDER_INDICATOR,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            header_width: 40,
            header_height: 21,
            row_height: None,
            column_width: None,
            min_column_width: 30,
            max_column_width: None,
            max_header_width: 300,
            cell_padding_horizontal: 2,
            cell_padding_vertical: 1,
            block_padding: 2,
            line_height: 15,
            row_height_reserve: 5,
            column_resize_threshold: 2,
            reorder_drag_distance: 10,
            invalidation_threshold: 250,
            can_select: true,
            allow_select_all: true,
            allow_escape_to_deselect: true,
            allow_flexible_rows: false,
            enable_mouse_hover_cell_background: true,
            enable_horizontal_scroll: true,
            enable_vertical_scroll: true,
            font: FontSpec::default(),
            colors: GridColors::default(),
            text_cache_capacity: 4096,
            overlay_detach_delay_ms: 10,
            tooltip_delay_ms: 500,
            drag_scroll_interval_ms: 50,
        }
    }
}

impl GridConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the layout cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.header_width < 0 || self.header_height < 0 {
            return Err(GridError::InvalidConfiguration(
                "header sizes must not be negative".to_string(),
            ));
        }
        if self.min_column_width < 1 {
            return Err(GridError::InvalidConfiguration(
                "min_column_width must be at least 1".to_string(),
            ));
        }
        if let Some(max) = self.max_column_width {
            if max < self.min_column_width {
                return Err(GridError::InvalidConfiguration(format!(
                    "max_column_width {max} is below min_column_width {}",
                    self.min_column_width
                )));
            }
        }
        Ok(())
    }

    /// Default row height: explicit setting, or font size plus padding.
    pub fn effective_row_height(&self) -> i32 {
        self.row_height.unwrap_or_else(|| {
            let font = i32::try_from(self.font.size).unwrap_or(12);
            font + 2 * self.cell_padding_vertical + 2 + self.row_height_reserve
        })
    }

    pub fn effective_column_width(&self) -> i32 {
        self.column_width
            .unwrap_or_else(|| self.effective_row_height() * 4)
            .max(self.min_column_width)
    }
}
