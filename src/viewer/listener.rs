//! Engine-to-host notifications.
//!
//! Hosts implement [`GridListener`] for the events they care about; every
//! method defaults to a no-op. [`EventLog`] records everything as
//! [`GridEvent`] values, which is what tests and the CLI use.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::types::{CellAddress, SelectionRect};

/// What a pending tooltip is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TooltipTarget {
    /// A whole cell, real address
    Cell(CellAddress),
    /// An active region of the hovered cell, by region index
    Region { cell: CellAddress, region: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub target: TooltipTarget,
    pub text: String,
}

/// Every notification the engine produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GridEvent {
    /// Model address of a left click on a cell or header
    CellClicked(CellAddress),
    /// Model address of a double click on a cell
    CellDoubleClicked(CellAddress),
    SelectionChanged {
        selection: Option<SelectionRect>,
        user: bool,
    },
    ScrolledRows,
    ScrolledColumns,
    /// Real column indices
    ColumnReorder { start: u32, target: u32 },
    /// A block command nobody handled; model address
    Command { address: CellAddress, command: String },
    Copy(String),
    /// `None` hides a tooltip shown earlier
    Tooltip(Option<Tooltip>),
}

/// Receiver of engine notifications.
pub trait GridListener {
    fn on_cell_clicked(&mut self, _address: CellAddress) {}

    fn on_cell_double_clicked(&mut self, _address: CellAddress) {}

    fn on_selection_changed(&mut self, _selection: Option<SelectionRect>, _user: bool) {}

    fn on_scrolled_rows(&mut self) {}

    fn on_scrolled_columns(&mut self) {}

    /// Asked on every pointer move of a column drag. Returning `false`
    /// cancels the move and hides the drop marker.
    fn before_column_reorder(&mut self, _start: u32, _target: u32) -> bool {
        true
    }

    fn on_column_reorder(&mut self, _start: u32, _target: u32) {}

    fn on_command(&mut self, _address: CellAddress, _command: &str) {}

    fn on_copy(&mut self, _tsv: &str) {}

    fn on_tooltip(&mut self, _tooltip: Option<&Tooltip>) {}
}

/// Route one event to the matching listener method.
pub(crate) fn deliver(listener: &mut dyn GridListener, event: &GridEvent) {
    match event {
        GridEvent::CellClicked(address) => listener.on_cell_clicked(*address),
        GridEvent::CellDoubleClicked(address) => listener.on_cell_double_clicked(*address),
        GridEvent::SelectionChanged { selection, user } => listener.on_selection_changed(*selection, *user),
        GridEvent::ScrolledRows => listener.on_scrolled_rows(),
        GridEvent::ScrolledColumns => listener.on_scrolled_columns(),
        GridEvent::ColumnReorder { start, target } => listener.on_column_reorder(*start, *target),
        GridEvent::Command { address, command } => listener.on_command(*address, command),
        GridEvent::Copy(tsv) => listener.on_copy(tsv),
        GridEvent::Tooltip(tooltip) => listener.on_tooltip(tooltip.as_ref()),
    }
}

/// Listener that records every event. Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GridEvent>>>,
    /// Answer given to `before_column_reorder`
    veto_reorder: Arc<Mutex<bool>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<GridEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make every subsequent `before_column_reorder` return `false`.
    pub fn set_veto_reorder(&self, veto: bool) {
        *self.veto_reorder.lock().unwrap_or_else(|p| p.into_inner()) = veto;
    }

    pub fn events(&self) -> Vec<GridEvent> {
        self.lock().clone()
    }

    pub fn take(&self) -> Vec<GridEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count(&self, predicate: impl Fn(&GridEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| predicate(e)).count()
    }

    fn push(&self, event: GridEvent) {
        self.lock().push(event);
    }
}

impl GridListener for EventLog {
    fn on_cell_clicked(&mut self, address: CellAddress) {
        self.push(GridEvent::CellClicked(address));
    }

    fn on_cell_double_clicked(&mut self, address: CellAddress) {
        self.push(GridEvent::CellDoubleClicked(address));
    }

    fn on_selection_changed(&mut self, selection: Option<SelectionRect>, user: bool) {
        self.push(GridEvent::SelectionChanged { selection, user });
    }

    fn on_scrolled_rows(&mut self) {
        self.push(GridEvent::ScrolledRows);
    }

    fn on_scrolled_columns(&mut self) {
        self.push(GridEvent::ScrolledColumns);
    }

    fn before_column_reorder(&mut self, _start: u32, _target: u32) -> bool {
        !*self.veto_reorder.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn on_column_reorder(&mut self, start: u32, target: u32) {
        self.push(GridEvent::ColumnReorder { start, target });
    }

    fn on_command(&mut self, address: CellAddress, command: &str) {
        self.push(GridEvent::Command {
            address,
            command: command.to_string(),
        });
    }

    fn on_copy(&mut self, tsv: &str) {
        self.push(GridEvent::Copy(tsv.to_string()));
    }

    fn on_tooltip(&mut self, tooltip: Option<&Tooltip>) {
        self.push(GridEvent::Tooltip(tooltip.cloned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_shares_between_clones() {
        let log = EventLog::new();
        let mut boxed: Box<dyn GridListener> = Box::new(log.clone());
        deliver(boxed.as_mut(), &GridEvent::ScrolledRows);
        deliver(boxed.as_mut(), &GridEvent::Copy("a\tb".into()));
        assert_eq!(log.len(), 2);
        assert_eq!(log.count(|e| matches!(e, GridEvent::Copy(_))), 1);
        assert_eq!(log.take().first(), Some(&GridEvent::ScrolledRows));
        assert!(log.is_empty());
    }

    #[test]
    fn test_veto_reorder() {
        let mut log = EventLog::new();
        assert!(log.before_column_reorder(0, 2));
        log.set_veto_reorder(true);
        assert!(!log.before_column_reorder(0, 2));
    }
}
