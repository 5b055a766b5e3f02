use serde::{Deserialize, Serialize};

use super::SimpleCellAddress;

/// How a selection rectangle was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionKind {
    /// A single cell (click or keyboard move)
    #[default]
    Cell,
    /// Whole row(s) selected through the row header
    RowBand,
    /// Whole column(s) selected through the column header
    ColumnBand,
    /// Arbitrary rectangle (drag, shift-click, select-all)
    Rect,
}

/// Rectangular selection in real coordinates, normalized so that
/// `from <= to` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRect {
    from: SimpleCellAddress,
    to: SimpleCellAddress,
    kind: SelectionKind,
}

impl SelectionRect {
    /// Build a rectangle from two opposite corners in any order.
    pub fn new(a: SimpleCellAddress, b: SimpleCellAddress) -> Self {
        Self::with_kind(a, b, SelectionKind::Rect)
    }

    pub fn with_kind(a: SimpleCellAddress, b: SimpleCellAddress, kind: SelectionKind) -> Self {
        Self {
            from: SimpleCellAddress::new(a.row.min(b.row), a.column.min(b.column)),
            to: SimpleCellAddress::new(a.row.max(b.row), a.column.max(b.column)),
            kind,
        }
    }

    pub fn single(cell: SimpleCellAddress) -> Self {
        Self::with_kind(cell, cell, SelectionKind::Cell)
    }

    /// Top-left corner.
    pub fn from(&self) -> SimpleCellAddress {
        self.from
    }

    /// Bottom-right corner (inclusive).
    pub fn to(&self) -> SimpleCellAddress {
        self.to
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    pub fn contains(&self, row: u32, column: u32) -> bool {
        row >= self.from.row && row <= self.to.row && column >= self.from.column && column <= self.to.column
    }

    pub fn row_count(&self) -> u32 {
        self.to.row - self.from.row + 1
    }

    pub fn column_count(&self) -> u32 {
        self.to.column - self.from.column + 1
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count()) * u64::from(self.column_count())
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = SimpleCellAddress> + '_ {
        (self.from.row..=self.to.row).flat_map(move |row| {
            (self.from.column..=self.to.column).map(move |column| SimpleCellAddress::new(row, column))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_corners() {
        let r = SelectionRect::new(SimpleCellAddress::new(5, 1), SimpleCellAddress::new(2, 4));
        assert_eq!(r.from(), SimpleCellAddress::new(2, 1));
        assert_eq!(r.to(), SimpleCellAddress::new(5, 4));
        assert_eq!(r.cell_count(), 16);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = SelectionRect::new(SimpleCellAddress::new(1, 1), SimpleCellAddress::new(2, 3));
        assert!(r.contains(1, 1));
        assert!(r.contains(2, 3));
        assert!(!r.contains(3, 3));
        assert!(!r.contains(2, 0));
    }

    #[test]
    fn test_cells_row_major() {
        let r = SelectionRect::new(SimpleCellAddress::new(0, 0), SimpleCellAddress::new(1, 1));
        let cells: Vec<_> = r.cells().collect();
        assert_eq!(
            cells,
            vec![
                SimpleCellAddress::new(0, 0),
                SimpleCellAddress::new(0, 1),
                SimpleCellAddress::new(1, 0),
                SimpleCellAddress::new(1, 1),
            ]
        );
    }
}
