//! Selection model tests through the engine
//!
//! Tests for programmatic selection, selection events, frozen-boundary
//! drags and the provider notification hooks.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use std::sync::{Arc, Mutex};

use common::{cell_center, view_fitting};
use gridview::error::Result;
use gridview::provider::{ContentProvider, TableProvider};
use gridview::types::{CellAddress, CellDescriptor, SelectionKind, SelectionRect, SimpleCellAddress};
use gridview::viewer::{GridEvent, Modifiers, PointerButton};

/// Provider that records the selections it is told about.
struct Watching {
    seen: Arc<Mutex<Vec<Option<SelectionRect>>>>,
}

impl ContentProvider for Watching {
    fn row_count(&self) -> u32 {
        20
    }

    fn column_count(&self) -> u32 {
        5
    }

    fn cell(&self, row: u32, column: u32) -> Result<CellDescriptor> {
        Ok(CellDescriptor::text(format!("{row}:{column}")))
    }

    fn on_selection_changed(&mut self, selection: Option<SelectionRect>) {
        self.seen.lock().unwrap().push(selection);
    }
}

// =============================================================================
// PROGRAMMATIC SELECTION
// =============================================================================

#[test]
fn test_select_cell_with_missing_row_selects_column() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.select_cell(None, Some(3));
    let rect = view.selection_rect().unwrap();
    assert_eq!(rect.kind(), SelectionKind::ColumnBand);
    assert_eq!((rect.from().row, rect.to().row), (0, 19));
    assert_eq!(view.current_cell(), CellAddress::column_header(3));
}

#[test]
fn test_select_cell_with_missing_column_selects_row() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.select_cell(Some(4), None);
    let rect = view.selection_rect().unwrap();
    assert_eq!(rect.kind(), SelectionKind::RowBand);
    assert_eq!(rect.cell_count(), 5);
}

#[test]
fn test_select_rect_moves_current_to_corner_and_scrolls() {
    let (mut view, log) = view_fitting(TableProvider::synthetic(200, 5), 10, 5);
    let rect = SelectionRect::new(SimpleCellAddress::new(120, 1), SimpleCellAddress::new(125, 3));
    view.select_rect(Some(rect));
    assert_eq!(view.current_cell(), CellAddress::cell(120, 1));
    assert!(view.viewport().first_row > 100);
    assert!(log.events().contains(&GridEvent::SelectionChanged {
        selection: Some(rect),
        user: true
    }));
}

#[test]
fn test_select_rect_none_clears() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.move_current_cell(Some(1), Some(1));
    view.select_rect(None);
    assert!(!view.selection().has_selection());
    assert!(view.current_cell().is_empty());
}

#[test]
fn test_provider_hears_selection_changes() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let provider = Watching { seen: Arc::clone(&seen) };
    let (mut view, _) = view_fitting(provider, 10, 5);
    view.move_current_cell(Some(2), Some(2));
    let last = seen.lock().unwrap().last().copied().flatten().unwrap();
    assert_eq!(last, SelectionRect::single(SimpleCellAddress::new(2, 2)));
}

#[test]
fn test_rearrangement_reports_non_user_change() {
    let (mut view, log) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.move_current_cell(Some(3), Some(3));
    log.take();
    view.notify_row_arrangement_changed();
    assert_eq!(
        log.events(),
        vec![GridEvent::SelectionChanged {
            selection: Some(SelectionRect::single(SimpleCellAddress::new(3, 3))),
            user: false
        }]
    );
}

// =============================================================================
// FROZEN BOUNDARY DRAGS
// =============================================================================

#[test]
fn test_drag_from_scroll_rows_into_frozen_stops_at_first_visible() {
    let provider = TableProvider::synthetic(200, 5).with_frozen_rows([0, 1]);
    let (mut view, _) = view_fitting(provider, 10, 5);
    view.scroll_to(20, 0);
    view.render();

    // Real row 25 is on screen below the frozen band.
    let start = cell_center(&view, 25, 1);
    view.pointer_down(start, PointerButton::Left, Modifiers::NONE);
    view.pointer_move(cell_center(&view, 0, 1));
    let rect = view.selection_rect().unwrap();
    assert_eq!(rect.from().row, 22, "first visible scroll row is real 22");
    assert_eq!(rect.to().row, 25);
}

#[test]
fn test_drag_inside_frozen_rows_stays_frozen() {
    let provider = TableProvider::synthetic(200, 5).with_frozen_rows([0, 1, 2]);
    let (mut view, _) = view_fitting(provider, 10, 5);
    view.scroll_to(20, 0);
    view.render();

    view.pointer_down(cell_center(&view, 0, 0), PointerButton::Left, Modifiers::NONE);
    view.pointer_move(cell_center(&view, 26, 2));
    let rect = view.selection_rect().unwrap();
    assert_eq!((rect.from().row, rect.to().row), (0, 2));
    assert_eq!((rect.from().column, rect.to().column), (0, 2));
}

#[test]
fn test_shift_click_extends_from_current() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.pointer_down(cell_center(&view, 1, 1), PointerButton::Left, Modifiers::NONE);
    view.pointer_up(cell_center(&view, 1, 1), PointerButton::Left);
    view.pointer_down(cell_center(&view, 4, 3), PointerButton::Left, Modifiers::SHIFT);
    let rect = view.selection_rect().unwrap();
    assert_eq!(rect.cell_count(), 12);
    assert_eq!(view.current_cell(), CellAddress::cell(1, 1), "shift-click keeps the anchor");
}
