//! Dirty-region tracking for incremental redraw.
//!
//! The tracker records which cells, rows, columns and headers changed since
//! the last render pass. A render with nothing invalidated is an explicit
//! full render; a render with some dirty entries draws only those.
//!
//! Dirty operations can be batched: while a scope is open no flush is
//! requested, and the outermost scope exit requests exactly one. Once more
//! cells are dirty than the threshold allows, the tracker promotes to a full
//! repaint, since compositing hundreds of small rects costs more than one
//! clear.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::types::CellAddress;

/// Default dirty-cell count that promotes to a full repaint.
pub const DEFAULT_INVALIDATION_THRESHOLD: usize = 250;

/// Dirty sets for one view.
#[derive(Debug, Clone)]
pub struct InvalidationTracker {
    cells: HashSet<(u32, u32)>,
    rows: HashSet<u32>,
    columns: HashSet<u32>,
    row_headers: HashSet<u32>,
    column_headers: HashSet<u32>,
    all: bool,
    grid_header: bool,
    threshold: usize,
    depth: u32,
    flush_requested: bool,
}

impl Default for InvalidationTracker {
    fn default() -> Self {
        Self::new(DEFAULT_INVALIDATION_THRESHOLD)
    }
}

impl InvalidationTracker {
    pub fn new(threshold: usize) -> Self {
        Self {
            cells: HashSet::new(),
            rows: HashSet::new(),
            columns: HashSet::new(),
            row_headers: HashSet::new(),
            column_headers: HashSet::new(),
            all: false,
            grid_header: false,
            threshold,
            depth: 0,
            flush_requested: false,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: usize) {
        self.threshold = threshold;
    }

    // ------------------------------------------------------------------
    // Scopes
    // ------------------------------------------------------------------

    /// Open a batch. Prefer [`scope`](Self::scope) where the borrow allows.
    pub fn begin_scope(&mut self) {
        self.depth += 1;
    }

    /// Close a batch; the outermost close requests a flush if anything is
    /// dirty.
    pub fn end_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && self.is_invalidated() {
            self.flush_requested = true;
        }
    }

    /// RAII batch that ends when dropped.
    pub fn scope(&mut self) -> InvalidationScope<'_> {
        self.begin_scope();
        InvalidationScope { tracker: self }
    }

    pub fn in_scope(&self) -> bool {
        self.depth > 0
    }

    fn touched(&mut self) {
        if self.depth == 0 {
            self.flush_requested = true;
        }
    }

    /// Hand the pending flush request to the caller.
    pub fn take_flush_request(&mut self) -> bool {
        std::mem::take(&mut self.flush_requested)
    }

    // ------------------------------------------------------------------
    // Invalidation
    // ------------------------------------------------------------------

    pub fn invalidate_all(&mut self) {
        self.all = true;
        self.touched();
    }

    pub fn invalidate_grid_header(&mut self) {
        self.grid_header = true;
        self.touched();
    }

    pub fn invalidate_cell(&mut self, row: u32, column: u32) {
        if !self.all {
            self.cells.insert((row, column));
            if self.cells.len() > self.threshold {
                trace!(target: "gridview::render", dirty = self.cells.len(), "dirty cells promoted to full repaint");
                self.all = true;
            }
        }
        self.touched();
    }

    pub fn invalidate_row(&mut self, row: u32) {
        self.rows.insert(row);
        self.touched();
    }

    pub fn invalidate_column(&mut self, column: u32) {
        self.columns.insert(column);
        self.touched();
    }

    pub fn invalidate_row_header(&mut self, row: u32) {
        self.row_headers.insert(row);
        self.touched();
    }

    pub fn invalidate_column_header(&mut self, column: u32) {
        self.column_headers.insert(column);
        self.touched();
    }

    /// Invalidate whatever an address names.
    pub fn invalidate_address(&mut self, address: CellAddress) {
        match (address.row, address.column) {
            _ if address.is_grid_header => self.invalidate_grid_header(),
            (Some(row), Some(column)) => self.invalidate_cell(row, column),
            (Some(row), None) => self.invalidate_row_header(row),
            (None, Some(column)) => self.invalidate_column_header(column),
            (None, None) => {}
        }
    }

    /// Promote to a full repaint when too many cells are dirty or the view
    /// sits at a scroll extreme.
    pub fn promote(&mut self, at_scroll_extreme: bool) {
        if self.cells.len() > self.threshold || at_scroll_extreme {
            self.all = true;
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// True when anything is dirty.
    pub fn is_invalidated(&self) -> bool {
        self.all
            || self.grid_header
            || !self.cells.is_empty()
            || !self.rows.is_empty()
            || !self.columns.is_empty()
            || !self.row_headers.is_empty()
            || !self.column_headers.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn dirty_cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The whole surface is repainted: everything is dirty, or nothing is
    /// and the pass is an explicit full render.
    pub fn needs_clear(&self) -> bool {
        self.all || !self.is_invalidated()
    }

    pub fn should_draw_cell(&self, row: u32, column: u32) -> bool {
        self.needs_clear()
            || self.cells.contains(&(row, column))
            || self.rows.contains(&row)
            || self.columns.contains(&column)
    }

    pub fn should_draw_row_header(&self, row: u32) -> bool {
        self.needs_clear() || self.row_headers.contains(&row) || self.rows.contains(&row)
    }

    pub fn should_draw_column_header(&self, column: u32) -> bool {
        self.needs_clear() || self.column_headers.contains(&column) || self.columns.contains(&column)
    }

    pub fn should_draw_grid_header(&self) -> bool {
        self.needs_clear() || self.grid_header
    }

    /// Forget every dirty entry; runs after each render pass.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.rows.clear();
        self.columns.clear();
        self.row_headers.clear();
        self.column_headers.clear();
        self.all = false;
        self.grid_header = false;
    }
}

/// Batch guard returned by [`InvalidationTracker::scope`].
pub struct InvalidationScope<'a> {
    tracker: &'a mut InvalidationTracker,
}

impl Deref for InvalidationScope<'_> {
    type Target = InvalidationTracker;

    fn deref(&self) -> &Self::Target {
        self.tracker
    }
}

impl DerefMut for InvalidationScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.tracker
    }
}

impl Drop for InvalidationScope<'_> {
    fn drop(&mut self) {
        self.tracker.end_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_nothing_invalidated_draws_everything() {
        let t = InvalidationTracker::default();
        assert!(t.needs_clear());
        assert!(t.should_draw_cell(3, 4));
        assert!(t.should_draw_grid_header());
    }

    #[test]
    fn test_dirty_row_limits_drawing() {
        let mut t = InvalidationTracker::default();
        t.invalidate_row(5);
        assert!(!t.needs_clear());
        assert!(t.should_draw_cell(5, 0));
        assert!(!t.should_draw_cell(6, 0));
        assert!(t.should_draw_row_header(5));
        assert!(!t.should_draw_column_header(0));
        assert!(!t.should_draw_grid_header());
    }

    #[test_case(CellAddress::cell(1, 2), true, false, false ; "cell")]
    #[test_case(CellAddress::row_header(1), false, true, false ; "row header")]
    #[test_case(CellAddress::column_header(2), false, false, true ; "column header")]
    fn test_invalidate_address(address: CellAddress, cell: bool, row_header: bool, column_header: bool) {
        let mut t = InvalidationTracker::default();
        t.invalidate_address(address);
        assert_eq!(t.should_draw_cell(1, 2), cell);
        assert_eq!(t.should_draw_row_header(1), row_header);
        assert_eq!(t.should_draw_column_header(2), column_header);
    }

    #[test]
    fn test_threshold_promotes_to_all() {
        let mut t = InvalidationTracker::new(3);
        for c in 0..3 {
            t.invalidate_cell(0, c);
        }
        assert!(!t.is_all());
        t.invalidate_cell(1, 0);
        assert!(t.is_all());
        assert!(t.should_draw_cell(99, 99));
    }

    #[test]
    fn test_scroll_extreme_promotes() {
        let mut t = InvalidationTracker::default();
        t.invalidate_cell(0, 0);
        t.promote(false);
        assert!(!t.is_all());
        t.promote(true);
        assert!(t.is_all());
    }

    #[test]
    fn test_nested_scopes_flush_once_at_outermost_exit() {
        let mut t = InvalidationTracker::default();
        {
            let mut outer = t.scope();
            outer.invalidate_cell(0, 0);
            {
                let mut inner = outer.scope();
                inner.invalidate_row(3);
            }
            assert!(!outer.take_flush_request());
        }
        assert!(t.take_flush_request());
        assert!(!t.take_flush_request());
    }

    #[test]
    fn test_unscoped_invalidation_requests_flush() {
        let mut t = InvalidationTracker::default();
        t.invalidate_column(2);
        assert!(t.take_flush_request());
    }

    #[test]
    fn test_empty_scope_requests_nothing() {
        let mut t = InvalidationTracker::default();
        drop(t.scope());
        assert!(!t.take_flush_request());
    }

    #[test]
    fn test_clear_resets() {
        let mut t = InvalidationTracker::default();
        t.invalidate_all();
        t.invalidate_cell(1, 1);
        t.clear();
        assert!(!t.is_invalidated());
        assert_eq!(t.dirty_cell_count(), 0);
    }
}
