//! Scroll coordination for `GridView`.
//!
//! A scroll on one axis by less than half a viewport shifts the pixels
//! already on the surface and dirties only the exposed strip. Anything else
//! falls back to a full repaint.

use tracing::{trace, warn};

use super::{GridEvent, GridView, Modifiers};
use crate::render::RenderSurface;
use crate::types::CellAddress;

/// Rows moved per wheel notch: half the vertical large change of 10.
const WHEEL_ROW_STEP: u32 = 5;
/// Columns moved per Ctrl+wheel notch: half the horizontal large change of 3.
const WHEEL_COLUMN_STEP: u32 = 1;

impl<S: RenderSurface> GridView<S> {
    pub fn max_first_row(&self) -> u32 {
        self.layout.max_first_row(&self.viewport, self.flexible_rows)
    }

    pub fn max_first_column(&self) -> u32 {
        self.layout.max_first_column(&self.viewport)
    }

    /// True when either axis sits at its last scroll position.
    pub fn at_scroll_extreme(&self) -> bool {
        let max_row = self.max_first_row();
        let max_column = self.max_first_column();
        (max_row > 0 && self.viewport.first_row >= max_row)
            || (max_column > 0 && self.viewport.first_column >= max_column)
    }

    /// Scroll so the given scroll indices come first, clamped to the limits.
    pub fn scroll_to(&mut self, first_row: u32, first_column: u32) {
        let row = first_row.min(self.max_first_row());
        let column = first_column.min(self.max_first_column());
        self.scroll_content(row, column);
    }

    pub fn scroll_rows_by(&mut self, delta: i64) {
        let row = offset(self.viewport.first_row, delta).min(self.max_first_row());
        self.scroll_content(row, self.viewport.first_column);
    }

    pub fn scroll_columns_by(&mut self, delta: i64) {
        let column = offset(self.viewport.first_column, delta).min(self.max_first_column());
        self.scroll_content(self.viewport.first_row, column);
    }

    /// Mouse wheel. A positive `delta` scrolls forward, DOM style. With Ctrl
    /// held the wheel scrolls columns.
    pub fn wheel(&mut self, delta: f64, modifiers: Modifiers) {
        let direction = if delta > 0.0 {
            1
        } else if delta < 0.0 {
            -1
        } else {
            return;
        };
        if modifiers.ctrl {
            if self.config.enable_horizontal_scroll {
                self.scroll_columns_by(direction * i64::from(WHEEL_COLUMN_STEP));
            }
        } else if self.config.enable_vertical_scroll {
            self.scroll_rows_by(direction * i64::from(WHEEL_ROW_STEP));
        }
    }

    pub(crate) fn scroll_content(&mut self, row: u32, column: u32) {
        let vp = self.viewport;
        if row == vp.first_row && column == vp.first_column {
            return;
        }
        let row_delta = u64::from(row.abs_diff(vp.first_row));
        let column_delta = u64::from(column.abs_diff(vp.first_column));

        if row != vp.first_row
            && column == vp.first_column
            && !self.invalidation.is_all()
            && row_delta * 2 < u64::from(self.layout.visible_row_count(&vp))
        {
            self.blit_rows(row);
            return;
        }

        if column != vp.first_column
            && row == vp.first_row
            && !self.invalidation.is_all()
            && column_delta * 2 < u64::from(self.layout.visible_column_count(&vp))
        {
            self.blit_columns(column);
            return;
        }

        let changed_row = row != vp.first_row;
        let changed_column = column != vp.first_column;
        trace!(target: "gridview::scroll", row, column, "scroll with full repaint");
        self.invalidation.begin_scope();
        self.viewport.first_row = row;
        self.viewport.first_column = column;
        self.count_visible_row_heights();
        self.invalidation.invalidate_all();
        self.invalidation.end_scope();

        if changed_row {
            self.emit(GridEvent::ScrolledRows);
        }
        if changed_column {
            self.emit(GridEvent::ScrolledColumns);
        }
    }

    fn blit_rows(&mut self, row: u32) {
        let old = self.viewport.first_row;
        let rows = &self.layout.rows;
        let scroll_y = rows.get_scroll(old, row);
        let exposed = rows.invalidate_after_scroll(old, row, self.layout.scroll_area_height(&self.viewport));
        trace!(target: "gridview::scroll", from = old, to = row, dy = scroll_y, "row blit");

        self.invalidation.begin_scope();
        for real in exposed {
            self.invalidation.invalidate_row(real);
        }
        self.viewport.first_row = row;
        let vp = self.viewport;
        let mut regions = vec![self.layout.scroll_rect(&vp), self.layout.row_headers_scroll_rect(&vp)];
        if self.layout.columns.frozen_count() > 0 {
            regions.push(self.layout.frozen_columns_rect(&vp));
        }
        for region in regions {
            if let Err(e) = self.surface.scroll_pixels(0, scroll_y, region) {
                warn!(target: "gridview::scroll", error = %e, "pixel scroll failed, repainting");
                self.invalidation.invalidate_all();
            }
        }
        self.invalidation.end_scope();

        if self.count_visible_row_heights() {
            self.invalidation.invalidate_all();
        }
        self.emit(GridEvent::ScrolledRows);
    }

    fn blit_columns(&mut self, column: u32) {
        let old = self.viewport.first_column;
        let columns = &self.layout.columns;
        let scroll_x = columns.get_scroll(old, column);
        let exposed = columns.invalidate_after_scroll(old, column, self.layout.scroll_area_width(&self.viewport));
        trace!(target: "gridview::scroll", from = old, to = column, dx = scroll_x, "column blit");

        self.invalidation.begin_scope();
        for real in exposed {
            self.invalidation.invalidate_column(real);
        }
        self.viewport.first_column = column;
        let vp = self.viewport;
        let mut regions = vec![self.layout.scroll_rect(&vp), self.layout.column_headers_scroll_rect(&vp)];
        if self.layout.rows.frozen_count() > 0 {
            regions.push(self.layout.frozen_rows_rect(&vp));
        }
        for region in regions {
            if let Err(e) = self.surface.scroll_pixels(scroll_x, 0, region) {
                warn!(target: "gridview::scroll", error = %e, "pixel scroll failed, repainting");
                self.invalidation.invalidate_all();
            }
        }
        self.invalidation.end_scope();
        self.emit(GridEvent::ScrolledColumns);
    }

    /// Scroll so a real address is fully visible. Frozen entries never
    /// scroll.
    pub fn scroll_into_view(&mut self, address: CellAddress) {
        if let Some(row) = address.row {
            let frozen = self.layout.rows.frozen_count();
            if row >= frozen {
                let first = self.layout.rows.scroll_in_view(
                    self.viewport.first_row,
                    row - frozen,
                    self.layout.scroll_area_height(&self.viewport),
                );
                self.scroll_content(first, self.viewport.first_column);
            }
        }
        if let Some(column) = address.column {
            let frozen = self.layout.columns.frozen_count();
            if column >= frozen {
                let first = self.layout.columns.scroll_in_view(
                    self.viewport.first_column,
                    column - frozen,
                    self.layout.scroll_area_width(&self.viewport),
                );
                self.scroll_content(self.viewport.first_row, first);
            }
        }
    }

    pub fn scroll_model_into_view(&mut self, address: CellAddress) {
        let real = self.layout.model_to_real(address);
        self.scroll_into_view(real);
    }

    pub fn scroll_current_cell_into_view(&mut self) {
        self.scroll_into_view(self.current_cell());
    }

    /// Clamp both first visible indices and the current cell after the
    /// arrangement or the surface size changed.
    pub(crate) fn fix_scroll_position(&mut self) {
        let max_row = self.max_first_row();
        let max_column = self.max_first_column();
        if self.viewport.first_row > max_row {
            self.viewport.first_row = max_row;
        }
        if self.viewport.first_column > max_column {
            self.viewport.first_column = max_column;
        }
        self.current = self.layout.clamp_address(self.current);
    }

    /// One auto-scroll step while a drag holds the pointer past an edge.
    pub(crate) fn drag_scroll_step(&mut self) {
        let behind = self.drag.behind;
        if !(behind.left || behind.right || behind.top || behind.bottom) {
            return;
        }
        let reorder = self.drag.start.is_column_header() && self.provider.enable_column_reorder();
        self.invalidation.begin_scope();
        if !reorder {
            let start_in_frozen = self
                .drag
                .start
                .row
                .is_some_and(|row| self.layout.rows.is_real_index_frozen(row));
            if !start_in_frozen {
                if behind.bottom && !self.last_scroll_entry_in_view(true) {
                    self.scroll_content(self.viewport.first_row + 1, self.viewport.first_column);
                }
                if behind.top {
                    if let Some(row) = self.viewport.first_row.checked_sub(1) {
                        self.scroll_content(row, self.viewport.first_column);
                    }
                }
            }
        }
        if behind.right && !self.last_scroll_entry_in_view(false) {
            self.scroll_content(self.viewport.first_row, self.viewport.first_column + 1);
        }
        if behind.left {
            if let Some(column) = self.viewport.first_column.checked_sub(1) {
                self.scroll_content(self.viewport.first_row, column);
            }
        }
        self.invalidation.invalidate_all();
        self.invalidation.end_scope();
    }

    fn last_scroll_entry_in_view(&self, rows: bool) -> bool {
        let vp = &self.viewport;
        let (series, first, extent) = if rows {
            (&self.layout.rows, vp.first_row, self.layout.scroll_area_height(vp))
        } else {
            (&self.layout.columns, vp.first_column, self.layout.scroll_area_width(vp))
        };
        match series.scroll_count().checked_sub(1) {
            Some(last) => series.is_whole_in_view(first, last, extent),
            None => true,
        }
    }
}

fn offset(index: u32, delta: i64) -> u32 {
    let moved = i64::from(index).saturating_add(delta).max(0);
    u32::try_from(moved).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::provider::TableProvider;
    use crate::render::RecordingSurface;
    use crate::viewer::EventLog;

    fn view(rows: u32, cols: u32) -> (GridView<RecordingSurface>, EventLog) {
        let config = GridConfig {
            row_height: Some(20),
            column_width: Some(80),
            header_height: 20,
            ..GridConfig::default()
        };
        let mut v = GridView::new(
            Box::new(TableProvider::synthetic(rows, cols)),
            RecordingSurface::new(640, 1020),
            config,
        )
        .unwrap();
        let log = EventLog::new();
        v.add_listener(Box::new(log.clone()));
        v.render();
        v.surface_mut().clear_ops();
        (v, log)
    }

    #[test]
    fn test_one_row_scroll_blits_and_dirties_one_strip() {
        let (mut v, log) = view(1000, 5);
        assert_eq!(v.layout().visible_row_count(v.viewport()), 50);
        v.scroll_to(1, 0);

        let scroll_rect = v.layout().scroll_rect(v.viewport());
        let blits: Vec<_> = v
            .surface()
            .scroll_ops()
            .into_iter()
            .filter(|(_, _, region)| *region == scroll_rect)
            .collect();
        assert_eq!(blits, vec![(0, -20, scroll_rect)]);
        assert!(!v.invalidation().is_all());
        assert!(v.invalidation().should_draw_cell(50, 0));
        assert!(!v.invalidation().should_draw_cell(20, 0));
        assert_eq!(log.events(), vec![GridEvent::ScrolledRows]);

        let stats = v.render();
        assert!(!stats.full_repaint);
        assert_eq!(stats.cells, 5);
    }

    #[test]
    fn test_large_scroll_repaints() {
        let (mut v, _) = view(1000, 5);
        v.scroll_to(40, 0);
        assert!(v.surface().scroll_ops().is_empty());
        assert!(v.invalidation().is_all());
    }

    #[test]
    fn test_both_axes_repaint_and_emit_both() {
        let (mut v, log) = view(1000, 50);
        v.scroll_to(1, 1);
        assert!(v.invalidation().is_all());
        assert_eq!(log.events(), vec![GridEvent::ScrolledRows, GridEvent::ScrolledColumns]);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let (mut v, _) = view(60, 5);
        v.scroll_to(500, 500);
        assert_eq!(v.viewport().first_row, v.max_first_row());
        assert_eq!(v.viewport().first_column, v.max_first_column());
        assert!(v.at_scroll_extreme());
    }

    #[test]
    fn test_wheel_moves_five_rows() {
        let (mut v, _) = view(1000, 5);
        v.wheel(120.0, Modifiers::NONE);
        assert_eq!(v.viewport().first_row, 5);
        v.wheel(-120.0, Modifiers::NONE);
        v.wheel(-120.0, Modifiers::NONE);
        assert_eq!(v.viewport().first_row, 0);
    }

    #[test]
    fn test_scroll_into_view_brings_row_in() {
        let (mut v, _) = view(1000, 5);
        v.scroll_into_view(CellAddress::cell(200, 0));
        let first = v.viewport().first_row;
        assert!(v.layout().rows.is_whole_in_view(first, 200, v.layout().scroll_area_height(v.viewport())));
        assert!(first > 0);
    }
}
