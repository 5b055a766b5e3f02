//! Rectangular selection over real coordinates.
//!
//! The selection is a single [`SelectionRect`] replaced wholesale by every
//! operation. Range builders turn an anchor and a pointer target into a
//! rectangle, splitting at the frozen boundary: one rectangle cannot hold
//! both the frozen entries and a scrolled window of the rest.

use crate::layout::{GridLayout, SeriesSizing, Viewport};
use crate::types::{CellAddress, SelectionKind, SelectionRect, SimpleCellAddress};

/// Current selection plus the enable flag.
#[derive(Debug, Clone)]
pub struct SelectionModel {
    rect: Option<SelectionRect>,
    can_select: bool,
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionModel {
    pub fn new() -> Self {
        Self {
            rect: None,
            can_select: true,
        }
    }

    pub fn can_select(&self) -> bool {
        self.can_select
    }

    /// Disabling hides the selection without dropping it.
    pub fn set_can_select(&mut self, can_select: bool) {
        self.can_select = can_select;
    }

    /// The selected rectangle, `None` while selection is disabled.
    pub fn rect(&self) -> Option<SelectionRect> {
        if self.can_select {
            self.rect
        } else {
            None
        }
    }

    pub fn has_selection(&self) -> bool {
        self.rect().is_some()
    }

    pub fn contains(&self, row: u32, column: u32) -> bool {
        self.rect().is_some_and(|r| r.contains(row, column))
    }

    pub fn select_cell(&mut self, cell: SimpleCellAddress) {
        self.rect = Some(SelectionRect::single(cell));
    }

    pub fn select_rect(&mut self, rect: SelectionRect) {
        self.rect = Some(rect);
    }

    /// Select a whole row across `column_count` columns.
    pub fn select_row(&mut self, row: u32, column_count: u32) {
        self.rect = column_count.checked_sub(1).map(|last| {
            SelectionRect::with_kind(
                SimpleCellAddress::new(row, 0),
                SimpleCellAddress::new(row, last),
                SelectionKind::RowBand,
            )
        });
    }

    /// Select a whole column across `row_count` rows.
    pub fn select_column(&mut self, column: u32, row_count: u32) {
        self.rect = row_count.checked_sub(1).map(|last| {
            SelectionRect::with_kind(
                SimpleCellAddress::new(0, column),
                SimpleCellAddress::new(last, column),
                SelectionKind::ColumnBand,
            )
        });
    }

    pub fn clear(&mut self) {
        self.rect = None;
    }
}

/// Clamp `min..=max` on one axis so it does not straddle the frozen
/// boundary. A frozen anchor keeps the frozen part; any other anchor keeps
/// the part from the first visible scroll entry on.
fn split_frozen(series: &SeriesSizing, first_visible: u32, anchor: u32, min: u32, max: u32) -> (u32, u32) {
    let frozen_count = series.frozen_count();
    if frozen_count == 0 {
        return (min, max);
    }
    if anchor < frozen_count {
        return (min, max.min(frozen_count - 1));
    }
    if min < frozen_count {
        let first_scroll = first_visible.saturating_add(frozen_count).max(frozen_count);
        return (first_scroll.min(anchor), max);
    }
    (min, max)
}

fn span(a: u32, b: u32, count: u32) -> Option<(u32, u32)> {
    let last = count.checked_sub(1)?;
    Some((a.min(b).min(last), a.max(b).min(last)))
}

/// Rectangle from a drag or shift-click between `anchor` and `target`.
///
/// A row-header anchor spans all columns and a column-header anchor spans
/// all rows.
pub fn cell_range(
    layout: &GridLayout,
    vp: &Viewport,
    anchor: CellAddress,
    target: CellAddress,
) -> Option<SelectionRect> {
    let rows = &layout.rows;
    let columns = &layout.columns;

    let (min_col, max_col) = if anchor.is_row_header() {
        (0, columns.real_count().checked_sub(1)?)
    } else {
        let (a, b) = (anchor.column?, target.column?);
        let (min, max) = span(a, b, columns.real_count())?;
        split_frozen(columns, vp.first_column, a, min, max)
    };

    let (min_row, max_row) = if anchor.is_column_header() {
        (0, rows.real_count().checked_sub(1)?)
    } else {
        let (a, b) = (anchor.row?, target.row?);
        let (min, max) = span(a, b, rows.real_count())?;
        split_frozen(rows, vp.first_row, a, min, max)
    };

    Some(SelectionRect::new(
        SimpleCellAddress::new(min_row, min_col),
        SimpleCellAddress::new(max_row, max_col),
    ))
}

/// Full rows between two row addresses.
pub fn row_band(
    layout: &GridLayout,
    vp: &Viewport,
    anchor: CellAddress,
    target: CellAddress,
) -> Option<SelectionRect> {
    let (a, b) = (anchor.row?, target.row?);
    let (min, max) = span(a, b, layout.rows.real_count())?;
    let (min, max) = split_frozen(&layout.rows, vp.first_row, a, min, max);
    let last_col = layout.columns.real_count().checked_sub(1)?;
    Some(SelectionRect::with_kind(
        SimpleCellAddress::new(min, 0),
        SimpleCellAddress::new(max, last_col),
        SelectionKind::RowBand,
    ))
}

/// Full columns between two column addresses.
pub fn column_band(
    layout: &GridLayout,
    vp: &Viewport,
    anchor: CellAddress,
    target: CellAddress,
) -> Option<SelectionRect> {
    let (a, b) = (anchor.column?, target.column?);
    let (min, max) = span(a, b, layout.columns.real_count())?;
    let (min, max) = split_frozen(&layout.columns, vp.first_column, a, min, max);
    let last_row = layout.rows.real_count().checked_sub(1)?;
    Some(SelectionRect::with_kind(
        SimpleCellAddress::new(0, min),
        SimpleCellAddress::new(last_row, max),
        SelectionKind::ColumnBand,
    ))
}

/// Everything below the frozen rows, and the cell select-all moves to.
pub fn select_all_rect(layout: &GridLayout) -> Option<(SelectionRect, SimpleCellAddress)> {
    let last_row = layout.rows.real_count().checked_sub(1)?;
    let last_col = layout.columns.real_count().checked_sub(1)?;
    let first_row = match layout.rows.frozen_count() {
        f if f <= last_row => f,
        _ => 0,
    };
    let start = SimpleCellAddress::new(first_row, 0);
    Some((
        SelectionRect::new(start, SimpleCellAddress::new(last_row, last_col)),
        start,
    ))
}
