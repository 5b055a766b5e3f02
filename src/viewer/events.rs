//! Pointer and keyboard handlers for `GridView`.
//!
//! Hosts forward native events here after converting them to surface pixels
//! and the types in [`input`](super::input). Every handler leaves its
//! invalidations batched and the host decides when to [`flush`].
//!
//! [`flush`]: GridView::flush

use tracing::trace;

use super::{CursorHint, DragState, Edges, GridEvent, GridView, Key, KeyInput, Modifiers, PointerButton, ResizeDrag};
use crate::layout::ResizeTarget;
use crate::render::{HoverTargets, RenderSurface};
use crate::selection;
use crate::types::{CellAddress, IntPoint};

impl<S: RenderSurface> GridView<S> {
    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    pub fn pointer_down(&mut self, pt: IntPoint, button: PointerButton, modifiers: Modifiers) {
        let cell = self.layout.cell_address(&self.viewport, pt);
        trace!(target: "gridview::events", x = pt.x, y = pt.y, ?button, ?cell, "pointer down");
        match button {
            PointerButton::Left => self.left_down(cell, pt, modifiers),
            PointerButton::Right => self.right_down(cell),
            PointerButton::Middle => {}
        }
    }

    fn left_down(&mut self, cell: CellAddress, pt: IntPoint, modifiers: Modifiers) {
        let model = self.layout.real_to_model(cell);
        if !cell.is_empty() {
            self.emit(GridEvent::CellClicked(model));
            self.provider.on_cell_clicked(model);
        }

        let command = self
            .renderer
            .hover_cell(cell)
            .and_then(|info| info.regions.iter().find(|r| r.rect.contains(pt)))
            .map(|r| r.command.clone())
            .filter(|c| !c.is_empty());
        if let Some(command) = command {
            self.handle_command(cell, &command);
            return;
        }

        if cell.is_grid_header() {
            if self.config.allow_select_all {
                self.select_all();
            }
            return;
        }

        let resizing = self.layout.resizing_column(&self.viewport, pt);
        if let Some(target) = resizing {
            let start_size = match target {
                ResizeTarget::RowHeader => self.layout.header_width(),
                ResizeTarget::Column(column) => self.layout.columns.get_size_by_real_index(column),
            };
            self.resize = Some(ResizeDrag {
                target,
                origin_x: pt.x,
                start_size,
            });
        }

        let column_header = cell.is_column_header() && resizing.is_none();
        let mut handled = false;
        if column_header {
            if let Some(column) = model.column {
                handled = self.provider.on_column_header_click(column);
            }
        }
        if cell.is_row_header() {
            if let Some(row) = model.row {
                handled = self.provider.on_row_header_click(row);
            }
        }

        self.invalidation.begin_scope();
        if !handled && (column_header || cell.is_row_header()) {
            if modifiers.shift {
                let band = if column_header {
                    selection::column_band(&self.layout, &self.viewport, cell, self.current)
                } else {
                    selection::row_band(&self.layout, &self.viewport, self.current, cell)
                };
                if let Some(rect) = band {
                    self.selection.select_rect(rect);
                }
            } else {
                match (cell.row, cell.column) {
                    (None, Some(column)) => self.selection.select_column(column, self.layout.rows.real_count()),
                    (Some(row), None) => self.selection.select_row(row, self.layout.columns.real_count()),
                    _ => {}
                }
                self.place_current_cell(cell);
                self.start_drag(cell, pt);
            }
            self.invalidation.invalidate_all();
            self.invalidation.end_scope();
            self.notify_selection_changed(true);
            return;
        }

        if let Some(simple) = cell.as_simple() {
            let anchored = modifiers.shift && self.current.is_cell();
            match selection::cell_range(&self.layout, &self.viewport, self.current, cell).filter(|_| anchored) {
                Some(rect) => self.selection.select_rect(rect),
                None => {
                    self.place_current_cell(cell);
                    self.selection.select_cell(simple);
                    self.start_drag(cell, pt);
                }
            }
            self.invalidation.invalidate_all();
            self.invalidation.end_scope();
            self.notify_selection_changed(true);
            return;
        }
        self.invalidation.end_scope();
    }

    fn start_drag(&mut self, cell: CellAddress, pt: IntPoint) {
        self.drag = DragState {
            start: cell,
            origin: pt,
            behind: Edges::default(),
            next_scroll: self.clock,
        };
    }

    /// Right press keeps a selection it lands in, otherwise selects what is
    /// under the pointer first.
    fn right_down(&mut self, cell: CellAddress) {
        let rect = self.selection.rect();
        let rows = self.layout.rows.real_count();
        let columns = self.layout.columns.real_count();
        match (cell.row, cell.column) {
            (Some(row), None) => {
                let in_band = rect.is_some_and(|r| r.contains(row, 0) && r.column_count() == columns);
                if in_band {
                    return;
                }
                self.selection.select_row(row, columns);
            }
            (None, Some(column)) => {
                let in_band = rect.is_some_and(|r| r.contains(0, column) && r.row_count() == rows);
                if in_band {
                    return;
                }
                self.selection.select_column(column, rows);
            }
            (Some(row), Some(column)) => {
                if self.selection.contains(row, column) {
                    return;
                }
                if let Some(simple) = cell.as_simple() {
                    self.selection.select_cell(simple);
                }
            }
            (None, None) => return,
        }
        self.invalidation.begin_scope();
        self.place_current_cell(cell);
        self.invalidation.invalidate_all();
        self.invalidation.end_scope();
        self.notify_selection_changed(true);
    }

    pub fn pointer_move(&mut self, pt: IntPoint) {
        let vp = self.viewport;
        let layout = &self.layout;
        self.drag.behind = Edges {
            left: pt.x < layout.header_width(),
            right: pt.x > vp.width,
            top: pt.y < layout.header_height() + layout.frozen_height(),
            bottom: pt.y > vp.height,
        };
        let cell = layout.cell_address(&vp, pt);

        let distance = i64::from(self.config.reorder_drag_distance);
        let reach = pt.distance_squared(self.drag.origin) > distance * distance;
        let reordering = self.drag.start.is_column_header() && self.provider.enable_column_reorder() && reach;
        let mut target = None;
        let mut cancelled = false;
        if reordering {
            if let (Some(start), Some(column)) = (self.drag.start.column, cell.column) {
                let t = self.reorder_target(column, pt);
                cancelled = !self.reorder_allowed(start, t);
                target = Some(t);
            }
        }

        self.invalidation.begin_scope();
        if let Some(resize) = self.resize {
            self.apply_resize(resize, pt);
        } else {
            self.cursor = if reordering {
                if cancelled {
                    CursorHint::NoDrop
                } else {
                    CursorHint::ReorderColumn
                }
            } else if self.layout.resizing_column(&vp, pt).is_some() {
                CursorHint::ResizeColumn
            } else {
                CursorHint::Default
            };
        }

        if self.drag.is_active() && self.resize.is_none() {
            if reordering {
                if let Some(start) = self.drag.start.column {
                    self.place_current_cell(self.drag.start);
                    self.update_reorder(start, target.filter(|_| !cancelled));
                }
            } else {
                self.drag_selection(cell);
            }
        }

        self.update_hover(cell, pt);
        self.invalidation.end_scope();
        self.update_tooltip();
    }

    fn apply_resize(&mut self, resize: ResizeDrag, pt: IntPoint) {
        let min = self.config.min_column_width;
        let size = (resize.start_size + (pt.x - resize.origin_x)).max(min);
        match resize.target {
            ResizeTarget::RowHeader => {
                self.layout.set_header_width(size.min(self.config.max_header_width));
            }
            ResizeTarget::Column(column) => {
                let area = self.layout.scroll_area_width(&self.viewport).max(min);
                self.layout.columns.resize(column, size.min(area));
            }
        }
        self.invalidation.invalidate_all();
    }

    fn drag_selection(&mut self, cell: CellAddress) {
        let start = self.drag.start;
        let rect = if start.is_cell() && cell.is_cell() {
            selection::cell_range(&self.layout, &self.viewport, start, cell)
        } else if start.is_row_header() && cell.row.is_some() {
            selection::row_band(&self.layout, &self.viewport, start, cell)
        } else {
            None
        };
        if let Some(rect) = rect {
            if self.selection.rect() != Some(rect) {
                self.selection.select_rect(rect);
                self.invalidation.invalidate_all();
                self.notify_selection_changed(true);
            }
        }
    }

    fn update_hover(&mut self, cell: CellAddress, pt: IntPoint) {
        let row = cell.row.filter(|_| cell.is_cell());
        let column = cell.column.filter(|_| cell.is_cell());
        if self.hover.row != row {
            for r in [self.hover.row, row].into_iter().flatten() {
                self.invalidation.invalidate_row(r);
            }
            self.hover.row = row;
        }
        if self.hover.column != column {
            for c in [self.hover.column, column].into_iter().flatten() {
                self.invalidation.invalidate_column(c);
            }
            self.hover.column = column;
        }

        let row_header = cell.row.filter(|_| cell.is_row_header());
        if self.hover.row_header != row_header {
            for r in [self.hover.row_header, row_header].into_iter().flatten() {
                self.invalidation.invalidate_row(r);
            }
            self.hover.row_header = row_header;
        }
        let column_header = cell.column.filter(|_| cell.is_column_header());
        if self.hover.column_header != column_header {
            for c in [self.hover.column_header, column_header].into_iter().flatten() {
                self.invalidation.invalidate_column_header(c);
            }
            self.hover.column_header = column_header;
        }

        if self.hover.cell != cell {
            self.invalidation.invalidate_address(self.hover.cell);
            self.invalidation.invalidate_address(cell);
            self.hover.cell = cell;
        } else if let Some(info) = self.renderer.hover_cell(cell) {
            let region_at = |p: Option<IntPoint>| p.and_then(|p| info.regions.iter().position(|r| r.rect.contains(p)));
            if region_at(self.hover.pointer) != region_at(Some(pt)) {
                self.invalidation.invalidate_address(cell);
            }
        }
        self.hover.pointer = Some(pt);
    }

    pub fn pointer_up(&mut self, _pt: IntPoint, button: PointerButton) {
        if button != PointerButton::Left {
            return;
        }
        if self.drag.is_active() {
            self.finish_reorder();
        }
        self.drag = DragState::default();
        self.escape_reorder();
        if self.resize.take().is_some() {
            self.fix_scroll_position();
            self.invalidation.invalidate_all();
        }
    }

    pub fn double_click(&mut self, pt: IntPoint) {
        let cell = self.layout.cell_address(&self.viewport, pt);
        let model = self.layout.real_to_model(cell);
        if model.is_cell() {
            self.emit(GridEvent::CellDoubleClicked(model));
            self.provider.on_cell_double_clicked(model);
        }
    }

    pub fn pointer_leave(&mut self) {
        self.invalidation.begin_scope();
        let hover = self.hover;
        for r in [hover.row, hover.row_header].into_iter().flatten() {
            self.invalidation.invalidate_row(r);
        }
        if let Some(c) = hover.column {
            self.invalidation.invalidate_column(c);
        }
        if let Some(c) = hover.column_header {
            self.invalidation.invalidate_column_header(c);
        }
        self.invalidation.invalidate_address(hover.cell);
        self.hover = HoverTargets::default();
        self.invalidation.end_scope();
        self.hide_tooltip();
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Returns whether the key was consumed.
    pub fn key_down(&mut self, input: KeyInput) -> bool {
        if self.provider.handle_key_down(&input) {
            return true;
        }
        self.invalidation.begin_scope();
        let handled = self.handle_key(input);
        self.invalidation.end_scope();
        handled
    }

    fn handle_key(&mut self, input: KeyInput) -> bool {
        if self.handle_cursor_move(input) {
            return true;
        }
        let ctrl = input.modifiers.ctrl;
        if ctrl && input.is_char('a') && self.config.allow_select_all {
            self.select_all();
            return true;
        }
        if input.key == Key::Escape {
            let live_overlay = self.renderer.overlay().is_some() && self.overlay_detach_due.is_none();
            if live_overlay {
                self.escape_reorder();
            } else if self.config.allow_escape_to_deselect && self.selection.has_selection() {
                self.selection.clear();
                self.current = CellAddress::EMPTY;
                self.invalidation.invalidate_all();
                self.notify_selection_changed(true);
            }
            self.drag.start = CellAddress::EMPTY;
            return true;
        }
        if ctrl && input.is_char('c') {
            self.copy_selection();
            return true;
        }
        false
    }

    /// Navigation keys. Axes without a current index stay empty.
    pub(crate) fn handle_cursor_move(&mut self, input: KeyInput) -> bool {
        let row = self.current.row;
        let column = self.current.column;
        let frozen = Some(self.layout.rows.frozen_count());
        let last_row = self.layout.rows.real_count().checked_sub(1);
        let last_column = self.layout.columns.real_count().checked_sub(1);
        let page = self.layout.visible_row_count(&self.viewport);
        let forward = |i: Option<u32>, n: u32| i.map(|i| i.saturating_add(n));
        let back = |i: Option<u32>, n: u32| i.map(|i| i.saturating_sub(n));

        let (row, column) = match (input.key, input.modifiers.ctrl) {
            (Key::Up, true) => (frozen, column),
            (Key::Down, true) => (last_row, column),
            (Key::Left, true) => (row, Some(0)),
            (Key::Right, true) => (row, last_column),
            (Key::Up, false) => (back(row, 1), column),
            (Key::Down, false) => (forward(row, 1), column),
            (Key::Left, false) => (row, back(column, 1)),
            (Key::Right, false) => (row, forward(column, 1)),
            (Key::Home, true) => (frozen, Some(0)),
            (Key::End, true) => (last_row, last_column),
            (Key::PageDown, true) => (last_row, column),
            (Key::PageUp, true) => (frozen, column),
            (Key::Home, false) => (row, Some(0)),
            (Key::End, false) => (row, last_column),
            (Key::PageDown, false) => (forward(row, page), column),
            (Key::PageUp, false) => (back(row, page), column),
            (Key::Enter, _) => (forward(row, 1), column),
            (Key::Tab, _) => (row, forward(column, 1)),
            _ => return false,
        };
        self.move_current_cell(row, column)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::provider::TableProvider;
    use crate::render::RecordingSurface;
    use crate::types::SelectionKind;
    use crate::viewer::EventLog;

    fn view(provider: TableProvider) -> (GridView<RecordingSurface>, EventLog) {
        let mut v = GridView::new(Box::new(provider), RecordingSurface::new(600, 400), GridConfig::default()).unwrap();
        let log = EventLog::new();
        v.add_listener(Box::new(log.clone()));
        v.render();
        (v, log)
    }

    fn center(v: &GridView<RecordingSurface>, row: u32, column: u32) -> IntPoint {
        let rect = v.layout().cell_rect(v.viewport(), row, column);
        IntPoint::new(rect.left + rect.width / 2, rect.center_y())
    }

    fn header_center(v: &GridView<RecordingSurface>, column: u32) -> IntPoint {
        let rect = v.layout().column_header_rect(v.viewport(), column);
        IntPoint::new(rect.left + rect.width / 2, rect.center_y())
    }

    #[test]
    fn test_click_selects_cell_and_reports_model_address() {
        let (mut v, log) = view(TableProvider::synthetic(20, 5).with_hidden_rows([0]));
        let pt = center(&v, 2, 1);
        v.pointer_down(pt, PointerButton::Left, Modifiers::NONE);
        v.pointer_up(pt, PointerButton::Left);
        assert_eq!(v.current_cell(), CellAddress::cell(2, 1));
        assert_eq!(log.events().first(), Some(&GridEvent::CellClicked(CellAddress::cell(3, 1))));
    }

    #[test]
    fn test_drag_extends_selection() {
        let (mut v, _) = view(TableProvider::synthetic(20, 5));
        v.pointer_down(center(&v, 1, 1), PointerButton::Left, Modifiers::NONE);
        v.pointer_move(center(&v, 3, 2));
        v.pointer_up(center(&v, 3, 2), PointerButton::Left);
        let rect = v.selection_rect().unwrap();
        assert_eq!(rect.cell_count(), 6);
        assert_eq!(v.current_cell(), CellAddress::cell(1, 1));
    }

    #[test]
    fn test_shift_click_row_headers_selects_band() {
        let (mut v, _) = view(TableProvider::synthetic(20, 5));
        v.move_current_cell(Some(2), Some(0));
        let rect = v.layout().row_header_rect(v.viewport(), 5);
        let pt = IntPoint::new(rect.left + 5, rect.center_y());
        v.pointer_down(pt, PointerButton::Left, Modifiers::SHIFT);
        let sel = v.selection_rect().unwrap();
        assert_eq!(sel.kind(), SelectionKind::RowBand);
        assert_eq!((sel.from().row, sel.to().row), (2, 5));
        assert_eq!(sel.column_count(), 5);
    }

    #[test]
    fn test_arrow_keys_move_and_clamp() {
        let (mut v, _) = view(TableProvider::synthetic(3, 3));
        v.move_current_cell(Some(0), Some(0));
        assert!(v.key_down(KeyInput::plain(Key::Down)));
        assert!(v.key_down(KeyInput::plain(Key::Right)));
        assert_eq!(v.current_cell(), CellAddress::cell(1, 1));
        v.key_down(KeyInput::ctrl(Key::End));
        assert_eq!(v.current_cell(), CellAddress::cell(2, 2));
        v.key_down(KeyInput::plain(Key::Down));
        assert_eq!(v.current_cell(), CellAddress::cell(2, 2));
        v.key_down(KeyInput::plain(Key::Home));
        assert_eq!(v.current_cell(), CellAddress::cell(2, 0));
    }

    #[test]
    fn test_escape_clears_selection() {
        let (mut v, log) = view(TableProvider::synthetic(5, 5));
        v.move_current_cell(Some(1), Some(1));
        log.take();
        assert!(v.key_down(KeyInput::plain(Key::Escape)));
        assert!(!v.selection().has_selection());
        assert!(v.current_cell().is_empty());
        assert_eq!(
            log.events(),
            vec![GridEvent::SelectionChanged {
                selection: None,
                user: true
            }]
        );
    }

    #[test]
    fn test_ctrl_a_selects_below_frozen_rows() {
        let (mut v, _) = view(TableProvider::synthetic(10, 4).with_frozen_rows([0, 1]));
        assert!(v.key_down(KeyInput::ctrl(Key::Char('a'))));
        let sel = v.selection_rect().unwrap();
        assert_eq!(sel.from().row, 2);
        assert_eq!(sel.to().row, 9);
        assert_eq!(v.current_cell(), CellAddress::cell(2, 0));
    }

    #[test]
    fn test_column_drag_reorders() {
        let (mut v, log) = view(TableProvider::synthetic(5, 5).with_column_reorder(true));
        v.pointer_down(header_center(&v, 0), PointerButton::Left, Modifiers::NONE);
        let mut to = header_center(&v, 3);
        to.x += 10;
        v.pointer_move(to);
        assert_eq!(v.cursor(), CursorHint::ReorderColumn);
        assert_eq!(v.overlay().and_then(|o| o.target), Some(4));
        v.pointer_up(to, PointerButton::Left);
        assert!(log.events().contains(&GridEvent::ColumnReorder { start: 0, target: 4 }));
    }

    #[test]
    fn test_vetoed_reorder_emits_nothing() {
        let (mut v, log) = view(TableProvider::synthetic(5, 5).with_column_reorder(true));
        log.set_veto_reorder(true);
        v.pointer_down(header_center(&v, 0), PointerButton::Left, Modifiers::NONE);
        v.pointer_move(header_center(&v, 3));
        assert_eq!(v.cursor(), CursorHint::NoDrop);
        v.pointer_up(header_center(&v, 3), PointerButton::Left);
        assert_eq!(log.count(|e| matches!(e, GridEvent::ColumnReorder { .. })), 0);
    }

    #[test]
    fn test_resize_column_by_dragging_edge() {
        let (mut v, _) = view(TableProvider::synthetic(5, 5));
        let rect = v.layout().column_header_rect(v.viewport(), 1);
        let edge = IntPoint::new(rect.right(), 5);
        let before = v.layout().columns.get_size_by_real_index(1);
        v.pointer_down(edge, PointerButton::Left, Modifiers::NONE);
        v.pointer_move(IntPoint::new(edge.x + 30, 5));
        v.pointer_up(IntPoint::new(edge.x + 30, 5), PointerButton::Left);
        assert_eq!(v.layout().columns.get_size_by_real_index(1), before + 30);
    }

    #[test]
    fn test_right_click_inside_selection_keeps_it() {
        let (mut v, _) = view(TableProvider::synthetic(10, 5));
        v.pointer_down(center(&v, 1, 1), PointerButton::Left, Modifiers::NONE);
        v.pointer_move(center(&v, 4, 3));
        v.pointer_up(center(&v, 4, 3), PointerButton::Left);
        let before = v.selection_rect();
        v.pointer_down(center(&v, 2, 2), PointerButton::Right, Modifiers::NONE);
        assert_eq!(v.selection_rect(), before);
        v.pointer_down(center(&v, 8, 0), PointerButton::Right, Modifiers::NONE);
        assert_eq!(v.current_cell(), CellAddress::cell(8, 0));
    }
}
