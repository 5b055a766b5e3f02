//! Clipboard export for `GridView`.
//!
//! Ctrl+C turns the selection into tab-separated text. A multi-cell copy
//! carries the column headers as its first line and the row header at the
//! start of every line; a single cell copies just its text.

use tracing::debug;

use super::{GridEvent, GridView};
use crate::render::RenderSurface;

impl<S: RenderSurface> GridView<S> {
    /// Selection as TSV, or `None` when there is nothing to copy.
    pub fn selection_text(&self) -> Option<String> {
        let rect = self.selection.rect()?;
        let (from, to) = (rect.from(), rect.to());
        let rows: Vec<u32> = (from.row..=to.row)
            .filter_map(|r| self.layout.rows.real_to_model(r))
            .collect();
        let columns: Vec<u32> = (from.column..=to.column)
            .filter_map(|c| self.layout.columns.real_to_model(c))
            .collect();

        if rect.cell_count() == 1 {
            let (&row, &column) = (rows.first()?, columns.first()?);
            let text = self.provider.cell_text(row, column);
            return (!text.trim().is_empty()).then_some(text);
        }

        let mut out = String::new();
        for &column in &columns {
            out.push('\t');
            out.push_str(&escape_cell_value(&self.provider.column_header_text(column)));
        }
        out.push('\n');
        for &row in &rows {
            out.push_str(&escape_cell_value(&self.provider.row_header_text(row)));
            for &column in &columns {
                out.push('\t');
                out.push_str(&escape_cell_value(&self.provider.cell_text(row, column)));
            }
            out.push('\n');
        }
        Some(out)
    }

    /// Build the TSV for the selection and hand it to listeners.
    pub fn copy_selection(&mut self) -> Option<String> {
        let text = self.selection_text()?;
        debug!(target: "gridview::clipboard", bytes = text.len(), "copy");
        self.emit(GridEvent::Copy(text.clone()));
        Some(text)
    }
}

/// Quote a value for TSV when it holds a tab, line break or quote; inner
/// quotes are doubled.
pub fn escape_cell_value(value: &str) -> String {
    let needs_quoting = value.contains(['\t', '\n', '\r', '"']);
    if needs_quoting {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
