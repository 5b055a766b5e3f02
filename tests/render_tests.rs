//! Viewport renderer tests
//!
//! Tests for what a pass draws: full repaints, dirty-only passes, frozen
//! panes, provider failures and the post-render hooks.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{cell_center, view_fitting};
use gridview::error::{GridError, Result};
use gridview::provider::{ContentProvider, TableProvider};
use gridview::render::DrawOp;
use gridview::types::{CellDecoration, CellDescriptor};

/// Provider whose third column always fails and which counts finished
/// passes.
struct Flaky {
    passes: Arc<AtomicUsize>,
}

impl ContentProvider for Flaky {
    fn row_count(&self) -> u32 {
        20
    }

    fn column_count(&self) -> u32 {
        5
    }

    fn cell(&self, row: u32, column: u32) -> Result<CellDescriptor> {
        if column == 2 {
            return Err(GridError::ContentProvider(format!("row {row} unavailable")));
        }
        let descriptor = CellDescriptor::text(format!("{row}/{column}"));
        Ok(if row == 4 {
            descriptor.with_decoration(CellDecoration::StrikeOutHorizontal, None)
        } else {
            descriptor
        })
    }

    fn on_invalidating_finished(&mut self) {
        self.passes.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// FULL PASSES
// =============================================================================

#[test]
fn test_full_render_draws_every_visible_entry() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.invalidation_mut().invalidate_all();
    let stats = view.render();
    assert!(stats.full_repaint);
    assert_eq!(stats.cells, 50);
    assert_eq!(stats.row_headers, 10);
    assert_eq!(stats.column_headers, 5);
    assert!(stats.grid_header);
    assert_eq!(view.surface().clear_count(), 1);
    assert!(view.surface().texts().contains(&"R9C4"));
    assert!(!view.surface().texts().contains(&"R10C0"), "row 10 is below the fold");
}

#[test]
fn test_frozen_panes_stay_on_screen() {
    let provider = TableProvider::synthetic(100, 10)
        .with_frozen_rows([0])
        .with_frozen_columns([0]);
    let (mut view, _) = view_fitting(provider, 10, 5);
    view.scroll_to(10, 2);
    view.surface_mut().clear_ops();
    view.render();

    let texts = view.surface().texts();
    assert!(texts.contains(&"R0C0"), "frozen corner");
    assert!(texts.contains(&"R0C3"), "frozen row over scrolled columns");
    assert!(texts.contains(&"R11C0"), "frozen column beside scrolled rows");
    assert!(texts.contains(&"R11C3"));
    assert!(!texts.contains(&"R1C1"), "scrolled out");
}

#[test]
fn test_render_without_dirt_is_full_pass() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    assert!(!view.invalidation().is_invalidated());
    assert!(view.flush().is_none(), "nothing asked for a flush");
    let stats = view.render();
    assert!(stats.full_repaint, "an explicit render with nothing dirty repaints");
}

// =============================================================================
// PARTIAL PASSES
// =============================================================================

#[test]
fn test_single_cell_invalidation_draws_one_cell() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.invalidation_mut().invalidate_cell(3, 2);
    let stats = view.flush().unwrap();
    assert!(!stats.full_repaint);
    assert_eq!(stats.cells, 1);
    assert_eq!(stats.row_headers, 0);
    assert_eq!(view.surface().clear_count(), 0);
    assert_eq!(view.surface().texts(), vec!["R3C2"]);
}

#[test]
fn test_too_many_dirty_cells_promote_to_full() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.invalidation_mut().set_threshold(4);
    for column in 0..5 {
        view.invalidation_mut().invalidate_cell(1, column);
    }
    assert!(view.invalidation().is_all());
    let stats = view.flush().unwrap();
    assert!(stats.full_repaint);
    assert_eq!(stats.cells, 50);
}

#[test]
fn test_hover_redraws_row_and_column() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.pointer_move(cell_center(&view, 5, 2));
    let stats = view.flush().unwrap();
    assert!(!stats.full_repaint);
    assert_eq!(stats.cells, 14, "one row of 5 plus one column of 10, sharing a cell");
    assert_eq!(stats.row_headers, 1);
    assert_eq!(stats.column_headers, 1);
    assert_eq!(view.hover().cell, gridview::types::CellAddress::cell(5, 2));

    view.surface_mut().clear_ops();
    view.pointer_leave();
    let stats = view.flush().unwrap();
    assert_eq!(stats.cells, 14, "leaving redraws the same entries");
    assert!(view.hover().pointer.is_none());
}

#[test]
fn test_current_cell_filled_with_selection_color() {
    let (mut view, _) = view_fitting(TableProvider::synthetic(20, 5), 10, 5);
    view.move_current_cell(Some(2), Some(1));
    view.flush().unwrap();
    let inner = view.layout().cell_rect(view.viewport(), 2, 1).grow_symmetrical(-1, -1);
    let selected = view.config().colors.selected;
    assert!(view.surface().ops().contains(&DrawOp::FillRect {
        rect: inner,
        color: selected
    }));
}

// =============================================================================
// PROVIDER FAILURES AND HOOKS
// =============================================================================

#[test]
fn test_failing_cells_draw_empty_and_are_counted() {
    let passes = Arc::new(AtomicUsize::new(0));
    let provider = Flaky {
        passes: Arc::clone(&passes),
    };
    let (mut view, _) = view_fitting(provider, 10, 5);
    assert_eq!(passes.load(Ordering::SeqCst), 1, "initial render finished once");

    view.invalidation_mut().invalidate_all();
    let stats = view.render();
    assert_eq!(stats.cells, 50, "failed cells are still painted");
    assert_eq!(stats.provider_errors, 10);
    assert!(!view.surface().texts().iter().any(|t| t.contains("unavailable")));
    assert_eq!(passes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_strike_out_decoration_draws_line() {
    let (mut view, _) = view_fitting(
        Flaky {
            passes: Arc::new(AtomicUsize::new(0)),
        },
        10,
        5,
    );
    view.invalidation_mut().invalidate_cell(4, 0);
    view.flush().unwrap();
    let rect = view.layout().cell_rect(view.viewport(), 4, 0);
    let lines: Vec<_> = view
        .surface()
        .ops()
        .iter()
        .filter_map(|op| match op {
            DrawOp::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].0.y, rect.top + rect.height / 2);
    assert_eq!((lines[0].0.x, lines[0].1.x), (rect.left, rect.right()));
}
