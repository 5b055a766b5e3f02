//! Common test utilities for gridview integration tests.
//!
//! Builds views over a [`RecordingSurface`] with round pixel sizes so
//! expectations can be written by hand.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use gridview::config::GridConfig;
use gridview::provider::{ContentProvider, TableProvider};
use gridview::render::RecordingSurface;
use gridview::types::IntPoint;
use gridview::viewer::{EventLog, GridView};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Logging
// ============================================================================

/// Route `gridview::*` traces to the test output, filtered by `RUST_LOG`
/// (default `warn`). Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Configuration
// ============================================================================

/// 20 px rows, 80 px columns, 40 x 20 px headers.
#[must_use]
pub fn round_config() -> GridConfig {
    GridConfig {
        row_height: Some(20),
        column_width: Some(80),
        header_width: 40,
        header_height: 20,
        ..GridConfig::default()
    }
}

// ============================================================================
// View Builders
// ============================================================================

/// View over `provider` with a surface showing exactly `rows` x `cols`
/// scroll entries of the round config.
pub fn view_fitting(provider: impl ContentProvider + 'static, rows: i32, cols: i32) -> (GridView<RecordingSurface>, EventLog) {
    init_tracing();
    let surface = RecordingSurface::new(40 + cols * 80, 20 + rows * 20);
    let mut view = GridView::new(Box::new(provider), surface, round_config()).expect("view");
    let log = EventLog::new();
    view.add_listener(Box::new(log.clone()));
    view.render();
    view.surface_mut().clear_ops();
    (view, log)
}

/// Synthetic `rows` x `cols` grid in an 800 x 1020 surface (50 visible rows).
pub fn synthetic_view(rows: u32, cols: u32) -> (GridView<RecordingSurface>, EventLog) {
    view_fitting(TableProvider::synthetic(rows, cols), 50, 9)
}

// ============================================================================
// Geometry Helpers
// ============================================================================

/// Center of a real cell on screen.
#[must_use]
pub fn cell_center(view: &GridView<RecordingSurface>, row: u32, column: u32) -> IntPoint {
    let rect = view.layout().cell_rect(view.viewport(), row, column);
    IntPoint::new(rect.left + rect.width / 2, rect.center_y())
}

#[must_use]
pub fn column_header_center(view: &GridView<RecordingSurface>, column: u32) -> IntPoint {
    let rect = view.layout().column_header_rect(view.viewport(), column);
    IntPoint::new(rect.left + rect.width / 2, rect.center_y())
}

#[must_use]
pub fn row_header_center(view: &GridView<RecordingSurface>, row: u32) -> IntPoint {
    let rect = view.layout().row_header_rect(view.viewport(), row);
    IntPoint::new(rect.width / 2, rect.center_y())
}
