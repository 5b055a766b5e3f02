//! gridview - virtualized spreadsheet grid engine
//!
//! Maps rows and columns of arbitrary size onto a pixel surface and redraws
//! only what changed:
//! - Per-axis sizing with hidden and frozen entries (model / real / scroll
//!   index spaces)
//! - Hit testing, column resize and drag-reorder
//! - Rectangular selection with a current cell
//! - Dirty tracking with pixel-scroll blits for small scrolls
//! - Canvas 2D surface on `wasm32`, a recording surface everywhere else
//!
//! # Usage
//!
//! ```
//! use gridview::config::GridConfig;
//! use gridview::provider::TableProvider;
//! use gridview::render::RecordingSurface;
//! use gridview::viewer::GridView;
//!
//! let provider = TableProvider::synthetic(1000, 20);
//! let mut view = GridView::new(Box::new(provider), RecordingSurface::new(800, 600), GridConfig::default())?;
//! let stats = view.render();
//! assert!(stats.full_repaint);
//! view.scroll_to(1, 0);
//! assert!(view.flush().is_some());
//! # Ok::<(), gridview::error::GridError>(())
//! ```

pub mod color;
pub mod config;
pub mod error;
pub mod layout;
pub mod provider;
pub mod render;
pub mod selection;
pub mod types;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use config::GridConfig;
pub use error::{GridError, Result};
pub use provider::{CancelToken, ContentProvider, TableProvider};
pub use viewer::GridView;

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
