//! Content provider contract.
//!
//! The engine pulls everything it draws from a [`ContentProvider`]. Indices
//! passed to the provider are model indices: hidden rows and columns still
//! count, and frozen ones keep their original position.
//!
//! A provider is `Send` so it can be built on a worker thread and handed to
//! [`GridView::set_provider`](crate::viewer::GridView::set_provider). The
//! engine itself only touches it from one thread.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{GridError, Result};
use crate::layout::moved_index;
use crate::types::{CellAddress, CellDescriptor, SelectionRect};
use crate::viewer::input::KeyInput;

/// Cooperative cancellation flag shared with background work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancelled, for use with `?` in loops.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(GridError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Source of grid content and receiver of interaction hooks.
///
/// Only the counts and [`cell`](Self::cell) are required. Every hook that
/// returns `bool` returns whether it consumed the interaction.
pub trait ContentProvider: Send {
    fn row_count(&self) -> u32;

    fn column_count(&self) -> u32;

    /// Descriptor of a data cell. An `Err` renders the cell empty.
    fn cell(&self, row: u32, column: u32) -> Result<CellDescriptor>;

    fn row_header(&self, row: u32) -> Result<CellDescriptor> {
        Ok(CellDescriptor::text((u64::from(row) + 1).to_string()))
    }

    fn column_header(&self, column: u32) -> Result<CellDescriptor> {
        Ok(CellDescriptor::text(format!("Column {}", u64::from(column) + 1)))
    }

    /// The corner above the row headers.
    fn grid_header(&self) -> Result<CellDescriptor> {
        Ok(CellDescriptor::empty())
    }

    fn hidden_rows(&self) -> BTreeSet<u32> {
        BTreeSet::new()
    }

    fn hidden_columns(&self) -> BTreeSet<u32> {
        BTreeSet::new()
    }

    fn frozen_rows(&self) -> BTreeSet<u32> {
        BTreeSet::new()
    }

    fn frozen_columns(&self) -> BTreeSet<u32> {
        BTreeSet::new()
    }

    /// Plain text for clipboard export.
    fn cell_text(&self, row: u32, column: u32) -> String {
        self.cell(row, column).map(|d| d.plain_text()).unwrap_or_default()
    }

    fn row_header_text(&self, row: u32) -> String {
        self.row_header(row).map(|d| d.plain_text()).unwrap_or_default()
    }

    fn column_header_text(&self, column: u32) -> String {
        self.column_header(column).map(|d| d.plain_text()).unwrap_or_default()
    }

    /// Whether column headers can be dragged to reorder columns.
    fn enable_column_reorder(&self) -> bool {
        false
    }

    /// First chance at a key press.
    fn handle_key_down(&mut self, _key: &KeyInput) -> bool {
        false
    }

    /// A block command was clicked at a model address.
    fn handle_command(&mut self, _address: CellAddress, _command: &str) -> bool {
        false
    }

    fn on_cell_clicked(&mut self, _address: CellAddress) {}

    fn on_cell_double_clicked(&mut self, _address: CellAddress) {}

    fn on_column_header_click(&mut self, _column: u32) -> bool {
        false
    }

    fn on_row_header_click(&mut self, _row: u32) -> bool {
        false
    }

    /// A column drag finished: move model column `start` in front of model
    /// column `target`. `target == column_count()` moves it to the end.
    /// The engine re-polls the arrangement afterwards.
    fn on_column_reorder(&mut self, _start: u32, _target: u32) {}

    fn on_selection_changed(&mut self, _selection: Option<SelectionRect>) {}

    /// Called after each completed render pass.
    fn on_invalidating_finished(&mut self) {}
}

/// In-memory provider over rows of strings.
#[derive(Debug, Clone, Default)]
pub struct TableProvider {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    hidden_rows: BTreeSet<u32>,
    hidden_columns: BTreeSet<u32>,
    frozen_rows: BTreeSet<u32>,
    frozen_columns: BTreeSet<u32>,
    reorder: bool,
}

impl TableProvider {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            ..Self::default()
        }
    }

    /// `rows` x `columns` grid of "R{row}C{column}" strings.
    pub fn synthetic(rows: u32, columns: u32) -> Self {
        let headers = (0..columns).map(|c| format!("Column {}", u64::from(c) + 1)).collect();
        let data = (0..rows)
            .map(|r| (0..columns).map(|c| format!("R{r}C{c}")).collect())
            .collect();
        Self::new(headers, data)
    }

    /// Collect rows until the source ends or `cancel` fires. A cancelled
    /// load keeps what it already has.
    pub fn load<I>(headers: Vec<String>, source: I, cancel: &CancelToken) -> Self
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut rows = Vec::new();
        for row in source {
            if cancel.is_cancelled() {
                debug!(target: "gridview::provider", loaded = rows.len(), "load cancelled");
                break;
            }
            rows.push(row);
        }
        Self::new(headers, rows)
    }

    pub fn with_frozen_rows(mut self, rows: impl IntoIterator<Item = u32>) -> Self {
        self.frozen_rows = rows.into_iter().collect();
        self
    }

    pub fn with_frozen_columns(mut self, columns: impl IntoIterator<Item = u32>) -> Self {
        self.frozen_columns = columns.into_iter().collect();
        self
    }

    pub fn with_hidden_rows(mut self, rows: impl IntoIterator<Item = u32>) -> Self {
        self.hidden_rows = rows.into_iter().collect();
        self
    }

    pub fn with_hidden_columns(mut self, columns: impl IntoIterator<Item = u32>) -> Self {
        self.hidden_columns = columns.into_iter().collect();
        self
    }

    pub fn with_column_reorder(mut self, enabled: bool) -> Self {
        self.reorder = enabled;
        self
    }

    pub fn value(&self, row: u32, column: u32) -> Option<&str> {
        let row = self.rows.get(usize::try_from(row).ok()?)?;
        row.get(usize::try_from(column).ok()?).map(String::as_str)
    }

    pub fn set_value(&mut self, row: u32, column: u32, value: impl Into<String>) -> Result<()> {
        let row_count = self.row_count();
        let cell = usize::try_from(row)
            .ok()
            .and_then(|r| self.rows.get_mut(r))
            .and_then(|r| usize::try_from(column).ok().and_then(|c| r.get_mut(c)))
            .ok_or(GridError::OutOfRange {
                index: row,
                count: row_count,
            })?;
        *cell = value.into();
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn move_column(&mut self, start: u32, target: u32) {
        fn shift<T>(items: &mut Vec<T>, start: usize, target: usize) {
            if start >= items.len() {
                return;
            }
            let item = items.remove(start);
            let at = if target > start { target - 1 } else { target };
            items.insert(at.min(items.len()), item);
        }
        let count = self.column_count();
        if start >= count {
            return;
        }
        let (Ok(from), Ok(to)) = (usize::try_from(start), usize::try_from(target)) else {
            return;
        };
        shift(&mut self.headers, from, to);
        for row in &mut self.rows {
            shift(row, from, to);
        }
        let remap = |set: &BTreeSet<u32>| -> BTreeSet<u32> {
            set.iter().map(|&c| moved_index(c, start, target, count)).collect()
        };
        self.hidden_columns = remap(&self.hidden_columns);
        self.frozen_columns = remap(&self.frozen_columns);
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl ContentProvider for TableProvider {
    fn row_count(&self) -> u32 {
        count_u32(self.rows.len())
    }

    fn column_count(&self) -> u32 {
        let widest = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        count_u32(widest.max(self.headers.len()))
    }

    fn cell(&self, row: u32, column: u32) -> Result<CellDescriptor> {
        if row >= self.row_count() {
            return Err(GridError::OutOfRange {
                index: row,
                count: self.row_count(),
            });
        }
        Ok(CellDescriptor::text(self.value(row, column).unwrap_or_default()))
    }

    fn column_header(&self, column: u32) -> Result<CellDescriptor> {
        let name = usize::try_from(column).ok().and_then(|c| self.headers.get(c));
        Ok(match name {
            Some(name) => CellDescriptor::text(name.clone()),
            None => CellDescriptor::text(format!("Column {}", u64::from(column) + 1)),
        })
    }

    fn hidden_rows(&self) -> BTreeSet<u32> {
        self.hidden_rows.clone()
    }

    fn hidden_columns(&self) -> BTreeSet<u32> {
        self.hidden_columns.clone()
    }

    fn frozen_rows(&self) -> BTreeSet<u32> {
        self.frozen_rows.clone()
    }

    fn frozen_columns(&self) -> BTreeSet<u32> {
        self.frozen_columns.clone()
    }

    fn cell_text(&self, row: u32, column: u32) -> String {
        self.value(row, column).unwrap_or_default().to_string()
    }

    fn enable_column_reorder(&self) -> bool {
        self.reorder
    }

    fn on_column_reorder(&mut self, start: u32, target: u32) {
        self.move_column(start, target);
    }
}
