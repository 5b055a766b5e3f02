//! Content-driven sizing: column auto-fit and flexible row heights.

use tracing::{debug, warn};

use super::GridView;
use crate::error::{GridError, Result};
use crate::provider::CancelToken;
use crate::render::RenderSurface;

/// Gap kept between a cell's content and the next column.
const COLUMN_CONTENT_GAP: i32 = 4;
/// Space left under the tallest flexible row.
const ROW_HEIGHT_MARGIN: i32 = 16;

impl<S: RenderSurface> GridView<S> {
    /// Fit every column to its header and to the rows currently visible.
    /// Widths only ever grow within one pass. Returns `Err(Cancelled)` when
    /// `cancel` fires; the widths measured so far are kept.
    pub fn recount_column_widths(&mut self, cancel: &CancelToken) -> Result<()> {
        self.layout.columns.clear_size_overrides();
        self.layout
            .columns
            .set_extraordinary_indexes(self.provider.hidden_columns(), self.provider.frozen_columns());
        let result = self.measure_columns(cancel);
        self.layout.columns.build_index();
        self.invalidation.invalidate_all();
        if let Err(GridError::Cancelled) = result {
            debug!(target: "gridview::autosize", "column fit cancelled");
        }
        result
    }

    pub(crate) fn recount_column_widths_logged(&mut self) {
        if let Err(e) = self.recount_column_widths(&CancelToken::new()) {
            warn!(target: "gridview::autosize", error = %e, "column fit failed");
        }
    }

    fn measure_columns(&mut self, cancel: &CancelToken) -> Result<()> {
        let pad = 2 * self.config.cell_padding_horizontal;
        let min_width = self.config.min_column_width;
        let columns: Vec<u32> = (0..self.layout.columns.real_count())
            .filter_map(|c| self.layout.columns.real_to_model(c))
            .collect();

        for &column in &columns {
            cancel.check()?;
            let Ok(header) = self.provider.column_header(column) else {
                continue;
            };
            let width = self.renderer.content_width(&header, &self.config.font, self.config.block_padding);
            self.layout
                .columns
                .put_size_override(column, (width + pad).max(min_width));
        }

        let rows = self.visible_model_rows();
        for row in rows {
            for &column in &columns {
                cancel.check()?;
                let Ok(cell) = self.provider.cell(row, column) else {
                    continue;
                };
                let width = self.renderer.content_width(&cell, &self.config.font, self.config.block_padding);
                self.layout
                    .columns
                    .put_size_override(column, width + pad + COLUMN_CONTENT_GAP);
            }
        }
        Ok(())
    }

    /// Model rows of the frozen band and the visible scroll rows.
    fn visible_model_rows(&self) -> Vec<u32> {
        let rows = &self.layout.rows;
        (0..rows.frozen_count())
            .chain(self.layout.visible_scroll_rows(&self.viewport))
            .filter_map(|r| rows.real_to_model(r))
            .collect()
    }

    /// Drop measured row heights and measure the visible rows again.
    pub fn recount_row_heights(&mut self) {
        self.layout.rows.clear_size_overrides();
        let height = self.layout.scroll_area_height(&self.viewport);
        if height > ROW_HEIGHT_MARGIN {
            self.layout.rows.set_max_size(Some(height - ROW_HEIGHT_MARGIN));
        }
        self.count_visible_row_heights();
        self.invalidation.invalidate_all();
    }

    /// With flexible rows on, size each visible row not measured yet to its
    /// tallest cell. Returns whether any row was measured.
    pub(crate) fn count_visible_row_heights(&mut self) -> bool {
        if !self.flexible_rows {
            return false;
        }
        let extra = 2 * self.config.cell_padding_vertical + 2 + self.config.row_height_reserve;
        let columns: Vec<u32> = (0..self.layout.columns.real_count())
            .filter_map(|c| self.layout.columns.real_to_model(c))
            .collect();
        let rows: Vec<u32> = self
            .layout
            .visible_scroll_rows(&self.viewport)
            .filter_map(|r| self.layout.rows.real_to_model(r))
            .filter(|&m| !self.layout.rows.has_size_override(m))
            .collect();

        let mut changed = false;
        for row in rows {
            changed = true;
            for &column in &columns {
                let Ok(cell) = self.provider.cell(row, column) else {
                    continue;
                };
                let height = self.renderer.content_height(&cell, &self.config.font);
                self.layout.rows.put_size_override(row, height + extra);
            }
        }
        self.layout.rows.build_index();
        changed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::provider::TableProvider;
    use crate::render::RecordingSurface;

    fn view(rows: Vec<Vec<String>>) -> GridView<RecordingSurface> {
        let provider = TableProvider::new(vec!["Id".into(), "Name".into()], rows);
        GridView::new(Box::new(provider), RecordingSurface::new(800, 400), GridConfig::default()).unwrap()
    }

    #[test]
    fn test_column_fit_uses_widest_visible_cell() {
        let mut v = view(vec![
            vec!["1".into(), "short".into()],
            vec!["2".into(), "a much longer value here".into()],
        ]);
        v.recount_column_widths(&CancelToken::new()).unwrap();
        let narrow = v.layout().columns.get_size_by_real_index(0);
        let wide = v.layout().columns.get_size_by_real_index(1);
        assert_eq!(narrow, v.config().min_column_width);
        assert!(wide > narrow);
    }

    #[test]
    fn test_cancelled_fit_reports_and_keeps_index() {
        let mut v = view(vec![vec!["1".into(), "x".into()]]);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = v.recount_column_widths(&cancel).unwrap_err();
        assert!(matches!(err, GridError::Cancelled));
        assert!(!v.layout().columns.is_index_stale());
    }

    #[test]
    fn test_flexible_rows_measure_once() {
        let mut v = view(vec![vec!["1".into(), "x".into()]; 5]);
        assert!(!v.count_visible_row_heights());
        v.set_flexible_rows(true);
        assert!(v.layout().rows.has_size_override(0));
        assert!(!v.count_visible_row_heights());
    }
}
