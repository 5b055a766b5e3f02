//! Cell address types.
//!
//! A [`CellAddress`] names one of five things on the grid surface: nothing,
//! the corner grid header, a row header, a column header, or a cell. Whether
//! an address is in model or real coordinates is decided by whoever holds
//! it; the engine keeps real addresses and converts at the provider boundary
//! through [`GridLayout`](crate::layout::GridLayout).

use serde::{Deserialize, Serialize};

/// Address on the grid surface.
///
/// Row/column presence and the grid-header flag are the discriminators.
/// Equality compares exactly those three fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: Option<u32>,
    pub column: Option<u32>,
    pub is_grid_header: bool,
}

impl CellAddress {
    pub const EMPTY: CellAddress = CellAddress {
        row: None,
        column: None,
        is_grid_header: false,
    };

    pub const GRID_HEADER: CellAddress = CellAddress {
        row: None,
        column: None,
        is_grid_header: true,
    };

    pub const fn new(row: Option<u32>, column: Option<u32>) -> Self {
        Self {
            row,
            column,
            is_grid_header: false,
        }
    }

    pub const fn cell(row: u32, column: u32) -> Self {
        Self::new(Some(row), Some(column))
    }

    pub const fn row_header(row: u32) -> Self {
        Self::new(Some(row), None)
    }

    pub const fn column_header(column: u32) -> Self {
        Self::new(None, Some(column))
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_none() && self.column.is_none() && !self.is_grid_header
    }

    pub fn is_cell(&self) -> bool {
        self.row.is_some() && self.column.is_some()
    }

    pub fn is_row_header(&self) -> bool {
        self.row.is_some() && self.column.is_none()
    }

    pub fn is_column_header(&self) -> bool {
        self.row.is_none() && self.column.is_some()
    }

    pub fn is_grid_header(&self) -> bool {
        self.is_grid_header
    }

    /// True when this address is the cell at (`row`, `column`).
    pub fn test_cell(&self, row: u32, column: u32) -> bool {
        self.row == Some(row) && self.column == Some(column)
    }

    pub fn with_row(self, row: Option<u32>) -> Self {
        Self { row, ..self }
    }

    pub fn with_column(self, column: Option<u32>) -> Self {
        Self { column, ..self }
    }

    /// The (row, column) pair when this is a cell.
    pub fn as_simple(&self) -> Option<SimpleCellAddress> {
        Some(SimpleCellAddress::new(self.row?, self.column?))
    }
}

impl From<SimpleCellAddress> for CellAddress {
    fn from(a: SimpleCellAddress) -> Self {
        CellAddress::cell(a.row, a.column)
    }
}

impl std::fmt::Display for CellAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.row, self.column) {
            _ if self.is_grid_header => write!(f, "GridHeader"),
            (Some(r), Some(c)) => write!(f, "R{r}C{c}"),
            (Some(r), None) => write!(f, "R{r}"),
            (None, Some(c)) => write!(f, "C{c}"),
            (None, None) => write!(f, "Empty"),
        }
    }
}

/// A plain (row, column) cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimpleCellAddress {
    pub row: u32,
    pub column: u32,
}

impl SimpleCellAddress {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminators() {
        assert!(CellAddress::EMPTY.is_empty());
        assert!(CellAddress::GRID_HEADER.is_grid_header());
        assert!(!CellAddress::GRID_HEADER.is_empty());
        assert!(CellAddress::row_header(3).is_row_header());
        assert!(CellAddress::column_header(3).is_column_header());
        assert!(CellAddress::cell(1, 2).is_cell());
        assert!(!CellAddress::cell(1, 2).is_row_header());
    }

    #[test]
    fn test_equality_uses_row_column_and_header_flag() {
        assert_eq!(CellAddress::cell(1, 2), CellAddress::new(Some(1), Some(2)));
        assert_ne!(CellAddress::EMPTY, CellAddress::GRID_HEADER);
        assert_ne!(CellAddress::row_header(1), CellAddress::column_header(1));
    }

    #[test]
    fn test_with_row_and_column() {
        let a = CellAddress::cell(1, 2).with_row(Some(5));
        assert!(a.test_cell(5, 2));
        let b = a.with_column(None);
        assert!(b.is_row_header());
    }

    #[test]
    fn test_display() {
        assert_eq!(CellAddress::cell(1, 2).to_string(), "R1C2");
        assert_eq!(CellAddress::GRID_HEADER.to_string(), "GridHeader");
        assert_eq!(CellAddress::EMPTY.to_string(), "Empty");
    }
}
