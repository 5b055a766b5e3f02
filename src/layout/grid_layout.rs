//! Two-axis grid geometry: pixel rects, hit testing and address conversion.
//!
//! [`GridLayout`] pairs the row and column [`SeriesSizing`] with the header
//! dimensions. Every screen-space query is answered for a [`Viewport`],
//! which carries the first visible scroll row/column and the surface size.
//!
//! Screen layout:
//!
//! ```text
//! +--------+---------------+-------------------------+
//! | grid   | frozen column | scrollable column       |
//! | header | headers       | headers                 |
//! +--------+---------------+-------------------------+
//! | frozen | frozen rows x | frozen rows x           |
//! | row    | frozen cols   | scroll cols             |
//! | headers|               |                         |
//! +--------+---------------+-------------------------+
//! | scroll | scroll rows x | scroll area             |
//! | row    | frozen cols   |                         |
//! | headers|               |                         |
//! +--------+---------------+-------------------------+
//! ```

use serde::{Deserialize, Serialize};

use super::series::{SeriesSizing, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
use crate::types::{CellAddress, IntPoint, IntRect};

/// Visible window of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Viewport {
    /// First visible scroll row
    pub first_row: u32,
    /// First visible scroll column
    pub first_column: u32,
    /// Surface width in pixels
    pub width: i32,
    /// Surface height in pixels
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            first_row: 0,
            first_column: 0,
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn scrolled_to(self, first_row: u32, first_column: u32) -> Self {
        Self {
            first_row,
            first_column,
            ..self
        }
    }
}

/// What a pointer press on a column header edge resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeTarget {
    /// The row header column (left edge of the first column)
    RowHeader,
    /// A real column index
    Column(u32),
}

/// Row and column sizing plus header dimensions.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub rows: SeriesSizing,
    pub columns: SeriesSizing,
    header_width: i32,
    header_height: i32,
    resize_threshold: i32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT, DEFAULT_COLUMN_WIDTH)
    }
}

impl GridLayout {
    pub fn new(row_height: i32, column_width: i32) -> Self {
        Self {
            rows: SeriesSizing::new(row_height),
            columns: SeriesSizing::new(column_width),
            header_width: 40,
            header_height: row_height.max(1),
            resize_threshold: 2,
        }
    }

    pub fn header_width(&self) -> i32 {
        self.header_width
    }

    pub fn header_height(&self) -> i32 {
        self.header_height
    }

    pub fn set_header_width(&mut self, width: i32) {
        self.header_width = width.max(0);
    }

    pub fn set_header_height(&mut self, height: i32) {
        self.header_height = height.max(0);
    }

    /// Pointer distance from a column edge that still counts as the edge.
    pub fn set_resize_threshold(&mut self, threshold: i32) {
        self.resize_threshold = threshold.max(0);
    }

    pub fn frozen_width(&self) -> i32 {
        self.columns.frozen_size()
    }

    pub fn frozen_height(&self) -> i32 {
        self.rows.frozen_size()
    }

    /// Width of the scrollable cell area.
    pub fn scroll_area_width(&self, vp: &Viewport) -> i32 {
        (vp.width - self.header_width - self.frozen_width()).max(0)
    }

    /// Height of the scrollable cell area.
    pub fn scroll_area_height(&self, vp: &Viewport) -> i32 {
        (vp.height - self.header_height - self.frozen_height()).max(0)
    }

    pub fn visible_row_count(&self, vp: &Viewport) -> u32 {
        self.rows
            .get_visible_scroll_count(vp.first_row, self.scroll_area_height(vp))
    }

    pub fn visible_column_count(&self, vp: &Viewport) -> u32 {
        self.columns
            .get_visible_scroll_count(vp.first_column, self.scroll_area_width(vp))
    }

    /// Real rows drawn in the scroll area.
    pub fn visible_scroll_rows(&self, vp: &Viewport) -> std::ops::Range<u32> {
        let start = vp.first_row.saturating_add(self.rows.frozen_count());
        let end = start
            .saturating_add(self.visible_row_count(vp))
            .min(self.rows.real_count());
        start..end.max(start)
    }

    /// Real columns drawn in the scroll area.
    pub fn visible_scroll_columns(&self, vp: &Viewport) -> std::ops::Range<u32> {
        let start = vp.first_column.saturating_add(self.columns.frozen_count());
        let end = start
            .saturating_add(self.visible_column_count(vp))
            .min(self.columns.real_count());
        start..end.max(start)
    }

    /// Largest useful first visible scroll column.
    pub fn max_first_column(&self, vp: &Viewport) -> u32 {
        self.columns.max_first_visible(self.scroll_area_width(vp))
    }

    /// Largest useful first visible scroll row. Flexible rows may change
    /// height while scrolling, so any row can come first.
    pub fn max_first_row(&self, vp: &Viewport, flexible_rows: bool) -> u32 {
        if flexible_rows {
            return self.rows.scroll_count().saturating_sub(1);
        }
        self.rows.max_first_visible(self.scroll_area_height(vp))
    }

    // ------------------------------------------------------------------
    // Pixel positions
    // ------------------------------------------------------------------

    /// Top edge of a real row on screen.
    pub fn row_top(&self, vp: &Viewport, row: u32) -> i32 {
        let frozen_count = self.rows.frozen_count();
        if row < frozen_count {
            return self.rows.get_frozen_position(row) + self.header_height;
        }
        self.rows.get_size_sum(vp.first_row, row - frozen_count) + self.header_height + self.frozen_height()
    }

    /// Left edge of a real column on screen.
    pub fn column_left(&self, vp: &Viewport, column: u32) -> i32 {
        let frozen_count = self.columns.frozen_count();
        if column < frozen_count {
            return self.columns.get_frozen_position(column) + self.header_width;
        }
        self.columns.get_size_sum(vp.first_column, column - frozen_count)
            + self.header_width
            + self.frozen_width()
    }

    /// Rect of a real cell. One pixel wider and higher than the entry so
    /// neighbouring grid lines overlap.
    pub fn cell_rect(&self, vp: &Viewport, row: u32, column: u32) -> IntRect {
        IntRect::from_xywh(
            self.column_left(vp, column),
            self.row_top(vp, row),
            self.columns.get_size_by_real_index(column) + 1,
            self.rows.get_size_by_real_index(row) + 1,
        )
    }

    pub fn row_header_rect(&self, vp: &Viewport, row: u32) -> IntRect {
        IntRect::from_xywh(
            0,
            self.row_top(vp, row),
            self.header_width + 1,
            self.rows.get_size_by_real_index(row) + 1,
        )
    }

    pub fn column_header_rect(&self, vp: &Viewport, column: u32) -> IntRect {
        IntRect::from_xywh(
            self.column_left(vp, column),
            0,
            self.columns.get_size_by_real_index(column) + 1,
            self.header_height + 1,
        )
    }

    pub fn grid_header_rect(&self) -> IntRect {
        IntRect::from_xywh(0, 0, self.header_width + 1, self.header_height + 1)
    }

    /// Area holding scroll rows x scroll columns.
    pub fn scroll_rect(&self, vp: &Viewport) -> IntRect {
        IntRect::from_xywh(
            self.header_width + self.frozen_width(),
            self.header_height + self.frozen_height(),
            self.scroll_area_width(vp),
            self.scroll_area_height(vp),
        )
    }

    pub fn row_headers_scroll_rect(&self, vp: &Viewport) -> IntRect {
        IntRect::from_xywh(
            0,
            self.header_height + self.frozen_height(),
            self.header_width + 1,
            self.scroll_area_height(vp),
        )
    }

    pub fn column_headers_scroll_rect(&self, vp: &Viewport) -> IntRect {
        IntRect::from_xywh(
            self.header_width + self.frozen_width(),
            0,
            self.scroll_area_width(vp),
            self.header_height + 1,
        )
    }

    /// Frozen columns beside the scroll rows; shifts with vertical scroll.
    pub fn frozen_columns_rect(&self, vp: &Viewport) -> IntRect {
        IntRect::from_xywh(
            self.header_width,
            self.header_height + self.frozen_height(),
            self.frozen_width() + 1,
            self.scroll_area_height(vp),
        )
    }

    /// Frozen rows above the scroll columns; shifts with horizontal scroll.
    pub fn frozen_rows_rect(&self, vp: &Viewport) -> IntRect {
        IntRect::from_xywh(
            self.header_width + self.frozen_width(),
            self.header_height,
            self.scroll_area_width(vp),
            self.frozen_height() + 1,
        )
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Address under a surface point.
    pub fn cell_address(&self, vp: &Viewport, pt: IntPoint) -> CellAddress {
        if pt.x < 0 || pt.y < 0 || pt.x >= vp.width || pt.y >= vp.height {
            return CellAddress::EMPTY;
        }
        if pt.x <= self.header_width && pt.y < self.header_height {
            return CellAddress::GRID_HEADER;
        }
        let row = series_index_on_position(pt.y, self.header_height, &self.rows, vp.first_row);
        let column = series_index_on_position(pt.x, self.header_width, &self.columns, vp.first_column);
        CellAddress::new(row, column)
    }

    /// Column whose right edge is under the pointer, when the pointer is
    /// inside the column header band.
    pub fn resizing_column(&self, vp: &Viewport, pt: IntPoint) -> Option<ResizeTarget> {
        if pt.y > self.header_height {
            return None;
        }
        let t = self.resize_threshold;
        let near = |edge: i32| pt.x >= edge - t && pt.x <= edge + t;
        let frozen_width = self.frozen_width();
        let frozen_count = self.columns.frozen_count();
        let x = pt.x - self.header_width;

        if x <= frozen_width + t {
            if frozen_count > 0 && (x - frozen_width).abs() <= t {
                return Some(ResizeTarget::Column(frozen_count - 1));
            }
            let index = self.columns.get_frozen_index_on_position(x);
            let begin = self.columns.get_position_by_real_index(index) + self.header_width;
            let end = begin + self.columns.get_size_by_real_index(index);
            if near(begin) {
                return Some(left_neighbour(index));
            }
            if frozen_count > 0 && near(end) {
                return Some(ResizeTarget::Column(index));
            }
            return None;
        }

        if self.columns.scroll_count() == 0 {
            return None;
        }
        let scroll_start = self.columns.get_position_by_scroll_index(vp.first_column);
        let index = self
            .columns
            .get_scroll_index_on_position(x - frozen_width + scroll_start);
        let begin = self.columns.get_position_by_scroll_index(index) + self.header_width + frozen_width
            - scroll_start;
        let end = begin + self.columns.get_size_by_scroll_index(index);
        if near(begin) {
            return Some(left_neighbour(index + frozen_count));
        }
        if near(end) {
            return Some(ResizeTarget::Column(index + frozen_count));
        }
        None
    }

    // ------------------------------------------------------------------
    // Address conversion
    // ------------------------------------------------------------------

    pub fn real_to_model(&self, address: CellAddress) -> CellAddress {
        CellAddress {
            row: address.row.and_then(|r| self.rows.real_to_model(r)),
            column: address.column.and_then(|c| self.columns.real_to_model(c)),
            is_grid_header: address.is_grid_header,
        }
    }

    /// Hidden rows or columns map to no real index.
    pub fn model_to_real(&self, address: CellAddress) -> CellAddress {
        CellAddress {
            row: address.row.and_then(|r| self.rows.model_to_real(r)),
            column: address.column.and_then(|c| self.columns.model_to_real(c)),
            is_grid_header: address.is_grid_header,
        }
    }

    /// Clamp a real address into the current counts; axes that no longer
    /// exist are dropped.
    pub fn clamp_address(&self, address: CellAddress) -> CellAddress {
        let clamp = |i: Option<u32>, count: u32| match i {
            Some(_) if count == 0 => None,
            Some(i) => Some(i.min(count - 1)),
            None => None,
        };
        CellAddress {
            row: clamp(address.row, self.rows.real_count()),
            column: clamp(address.column, self.columns.real_count()),
            is_grid_header: address.is_grid_header,
        }
    }
}

fn left_neighbour(real: u32) -> ResizeTarget {
    match real.checked_sub(1) {
        Some(column) => ResizeTarget::Column(column),
        None => ResizeTarget::RowHeader,
    }
}

/// Real index under `position` on one axis, `None` over the header or past
/// the last entry.
fn series_index_on_position(position: i32, header: i32, series: &SeriesSizing, first: u32) -> Option<u32> {
    if position <= header {
        return None;
    }
    let offset = position - header;
    let frozen_size = series.frozen_size();
    if series.frozen_count() > 0 && offset <= frozen_size {
        return Some(series.get_frozen_index_on_position(offset));
    }
    if series.scroll_count() == 0 {
        return None;
    }
    let absolute = offset - frozen_size + series.get_position_by_scroll_index(first);
    if absolute >= series.total_scroll_size() {
        return None;
    }
    Some(series.get_scroll_index_on_position(absolute) + series.frozen_count())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn layout(rows: u32, cols: u32) -> GridLayout {
        let mut l = GridLayout::new(20, 80);
        l.set_header_width(40);
        l.set_header_height(20);
        l.rows.set_count(rows);
        l.columns.set_count(cols);
        l
    }

    #[test]
    fn test_cell_rect_overlaps_grid_lines() {
        let l = layout(100, 10);
        let vp = Viewport::new(800, 600);
        assert_eq!(l.cell_rect(&vp, 0, 0), IntRect::from_xywh(40, 20, 81, 21));
        assert_eq!(l.cell_rect(&vp, 2, 1), IntRect::from_xywh(120, 60, 81, 21));
    }

    #[test]
    fn test_row_top_follows_scroll_but_not_frozen() {
        let mut l = layout(100, 10);
        l.rows.set_extraordinary_indexes([], [0, 1]);
        let vp = Viewport::new(800, 600).scrolled_to(5, 0);
        assert_eq!(l.row_top(&vp, 0), 20);
        assert_eq!(l.row_top(&vp, 1), 40);
        // real 7 = scroll 5 = first visible
        assert_eq!(l.row_top(&vp, 7), 20 + 40);
        assert_eq!(l.row_top(&vp, 8), 20 + 40 + 20);
    }

    #[test]
    fn test_visible_ranges() {
        let l = layout(1000, 100);
        let vp = Viewport::new(40 + 800, 20 + 1000);
        assert_eq!(l.visible_scroll_rows(&vp), 0..50);
        assert_eq!(l.visible_scroll_columns(&vp), 0..10);
        let vp = vp.scrolled_to(990, 95);
        assert_eq!(l.visible_scroll_rows(&vp), 990..1000);
        assert_eq!(l.visible_scroll_columns(&vp), 95..100);
    }

    #[test]
    fn test_cell_address_hit_test() {
        let mut l = layout(100, 10);
        l.rows.set_extraordinary_indexes([], [0]);
        let vp = Viewport::new(800, 600).scrolled_to(3, 0);
        assert_eq!(l.cell_address(&vp, IntPoint::new(10, 10)), CellAddress::GRID_HEADER);
        assert_eq!(l.cell_address(&vp, IntPoint::new(10, 30)), CellAddress::row_header(0));
        assert_eq!(l.cell_address(&vp, IntPoint::new(50, 10)), CellAddress::column_header(0));
        assert_eq!(l.cell_address(&vp, IntPoint::new(130, 30)), CellAddress::cell(0, 1));
        // first scroll row (scroll 3 = real 4) starts at y = 40
        assert_eq!(l.cell_address(&vp, IntPoint::new(50, 45)), CellAddress::cell(4, 0));
        assert_eq!(l.cell_address(&vp, IntPoint::new(900, 45)), CellAddress::EMPTY);
        // Captured pointer left of or above the surface.
        assert_eq!(l.cell_address(&vp, IntPoint::new(-5, 10)), CellAddress::EMPTY);
        assert_eq!(l.cell_address(&vp, IntPoint::new(10, -1)), CellAddress::EMPTY);
    }

    #[test]
    fn test_cell_address_past_last_column_has_no_column() {
        let l = layout(5, 2);
        let vp = Viewport::new(800, 600);
        let a = l.cell_address(&vp, IntPoint::new(500, 30));
        assert_eq!(a, CellAddress::row_header(0));
    }

    #[test]
    fn test_resizing_column_edges() {
        let l = layout(10, 10);
        let vp = Viewport::new(800, 600);
        // right edge of column 0 at x = 120
        assert_eq!(l.resizing_column(&vp, IntPoint::new(121, 5)), Some(ResizeTarget::Column(0)));
        assert_eq!(l.resizing_column(&vp, IntPoint::new(199, 5)), Some(ResizeTarget::Column(1)));
        assert_eq!(l.resizing_column(&vp, IntPoint::new(41, 5)), Some(ResizeTarget::RowHeader));
        assert_eq!(l.resizing_column(&vp, IntPoint::new(80, 5)), None);
        assert_eq!(l.resizing_column(&vp, IntPoint::new(121, 50)), None);
    }

    #[test]
    fn test_resizing_frozen_boundary() {
        let mut l = layout(10, 10);
        l.columns.set_extraordinary_indexes([], [0, 1]);
        let vp = Viewport::new(800, 600).scrolled_to(0, 4);
        assert_eq!(l.resizing_column(&vp, IntPoint::new(40 + 160, 5)), Some(ResizeTarget::Column(1)));
        assert_eq!(l.resizing_column(&vp, IntPoint::new(40 + 80, 5)), Some(ResizeTarget::Column(0)));
        // first scroll column on screen is real 6
        assert_eq!(l.resizing_column(&vp, IntPoint::new(40 + 240, 5)), Some(ResizeTarget::Column(6)));
    }

    #[test]
    fn test_address_conversion_round_trip() {
        let mut l = layout(10, 10);
        l.rows.set_extraordinary_indexes([3, 5], [0, 1]);
        let model = CellAddress::cell(4, 2);
        let real = l.model_to_real(model);
        assert_eq!(real, CellAddress::cell(3, 2));
        assert_eq!(l.real_to_model(real), model);
        assert_eq!(l.model_to_real(CellAddress::cell(3, 2)).row, None);
        assert_eq!(l.real_to_model(CellAddress::GRID_HEADER), CellAddress::GRID_HEADER);
    }

    #[test]
    fn test_clamp_address() {
        let l = layout(5, 3);
        assert_eq!(l.clamp_address(CellAddress::cell(9, 9)), CellAddress::cell(4, 2));
        let empty = layout(0, 3);
        assert_eq!(empty.clamp_address(CellAddress::cell(2, 9)), CellAddress::column_header(2));
    }

    #[test]
    fn test_blit_regions() {
        let mut l = layout(100, 20);
        l.rows.set_extraordinary_indexes([], [0]);
        l.columns.set_extraordinary_indexes([], [0]);
        let vp = Viewport::new(800, 600);
        assert_eq!(l.scroll_rect(&vp), IntRect::from_xywh(120, 40, 680, 560));
        assert_eq!(l.frozen_rows_rect(&vp), IntRect::from_xywh(120, 20, 680, 21));
        assert_eq!(l.frozen_columns_rect(&vp), IntRect::from_xywh(40, 40, 81, 560));
        assert_eq!(l.row_headers_scroll_rect(&vp), IntRect::from_xywh(0, 40, 41, 560));
        assert_eq!(l.column_headers_scroll_rect(&vp), IntRect::from_xywh(120, 0, 680, 21));
    }
}
