//! Column drag-reorder overlay.

use std::time::Duration;

use tracing::debug;

use super::{CursorHint, GridEvent, GridView};
use crate::render::{RenderSurface, ReorderOverlay};
use crate::types::IntPoint;

impl<S: RenderSurface> GridView<S> {
    /// Real column a drop at `pt` over `column` would land before.
    pub(crate) fn reorder_target(&self, column: u32, pt: IntPoint) -> u32 {
        let rect = self.layout.column_header_rect(&self.viewport, column);
        if pt.x > rect.left + rect.width / 2 {
            column.saturating_add(1)
        } else {
            column
        }
    }

    /// Ask listeners whether a move is allowed. Every listener is asked.
    pub(crate) fn reorder_allowed(&mut self, start: u32, target: u32) -> bool {
        let mut allowed = true;
        for listener in &mut self.listeners {
            allowed &= listener.before_column_reorder(start, target);
        }
        allowed
    }

    /// Show the drag marker for `start` at `target`. A drop that would leave
    /// the column where it is shows no marker.
    pub(crate) fn update_reorder(&mut self, start: u32, target: Option<u32>) {
        let target = target.filter(|&t| t != start && t != start.saturating_add(1));
        let overlay = Some(ReorderOverlay { column: start, target });
        self.overlay_detach_due = None;
        if self.renderer.overlay() != overlay {
            self.renderer.set_overlay(overlay);
            self.invalidation.invalidate_all();
        }
    }

    /// Leave reorder mode; the marker disappears on a later tick.
    pub(crate) fn escape_reorder(&mut self) {
        if self.renderer.overlay().is_some() {
            self.overlay_detach_due = Some(self.clock + Duration::from_millis(self.config.overlay_detach_delay_ms));
        }
        self.cursor = CursorHint::Default;
    }

    /// Apply a finished drag, if it has somewhere to go. The provider hears
    /// model columns; listeners hear the real columns that were dragged.
    pub(crate) fn finish_reorder(&mut self) {
        let Some(ReorderOverlay {
            column,
            target: Some(target),
        }) = self.renderer.overlay()
        else {
            return;
        };
        if self.overlay_detach_due.is_some() {
            return;
        }
        let columns = &self.layout.columns;
        let Some(model_start) = columns.real_to_model(column) else {
            return;
        };
        let model_target = if target >= columns.real_count() {
            columns.count()
        } else {
            columns.real_to_model(target).unwrap_or_else(|| columns.count())
        };
        debug!(target: "gridview::reorder", column, target, model_start, model_target, "column reorder");
        self.provider.on_column_reorder(model_start, model_target);
        self.layout.columns.move_size_overrides(model_start, model_target);
        self.emit(GridEvent::ColumnReorder { start: column, target });
        self.notify_column_arrangement_changed();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::provider::TableProvider;
    use crate::render::RecordingSurface;

    fn view() -> GridView<RecordingSurface> {
        let provider = TableProvider::synthetic(10, 5).with_column_reorder(true);
        GridView::new(Box::new(provider), RecordingSurface::new(600, 300), GridConfig::default()).unwrap()
    }

    #[test]
    fn test_noop_targets_hide_marker() {
        let mut v = view();
        v.update_reorder(2, Some(3));
        assert_eq!(v.overlay(), Some(ReorderOverlay { column: 2, target: None }));
        v.update_reorder(2, Some(0));
        assert_eq!(v.overlay(), Some(ReorderOverlay { column: 2, target: Some(0) }));
    }

    #[test]
    fn test_escape_detaches_after_delay() {
        let mut v = view();
        v.update_reorder(1, Some(4));
        v.escape_reorder();
        v.tick(Duration::from_millis(5));
        assert!(v.overlay().is_some());
        v.tick(Duration::from_millis(10));
        assert!(v.overlay().is_none());
    }

    #[test]
    fn test_target_follows_header_half() {
        let v = view();
        let rect = v.layout().column_header_rect(v.viewport(), 1);
        assert_eq!(v.reorder_target(1, IntPoint::new(rect.left + 2, 5)), 1);
        assert_eq!(v.reorder_target(1, IntPoint::new(rect.right() - 2, 5)), 2);
    }
}
