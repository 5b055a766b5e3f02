//! Layout engine: per-axis sizing and two-axis grid geometry.
//!
//! This module handles:
//! - Model / real / scroll index mapping under hide and freeze
//! - Prefix-sum positions with binary search lookup
//! - Cell, header and blit-region rects for a viewport
//! - Hit testing and column-resize edge detection

mod grid_layout;
mod series;

pub use grid_layout::{GridLayout, ResizeTarget, Viewport};
pub use series::{moved_index, SeriesSizing, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
