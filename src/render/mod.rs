//! Rendering: dirty tracking, block layout and the viewport pass.
//!
//! This module provides:
//! - The [`RenderSurface`] trait and a headless [`RecordingSurface`]
//! - Canvas 2D surface on `wasm32`
//! - Text measurement with a per-engine LRU cache
//! - The [`ViewportRenderer`] that drives a pass

pub mod cache;
pub mod cell_layout;
pub mod invalidation;
pub mod measure;
pub mod recording;
pub mod renderer;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod canvas;

pub use cell_layout::{ActiveRegion, CellLayout};
pub use invalidation::{InvalidationTracker, DEFAULT_INVALIDATION_THRESHOLD};
pub use measure::{FixedWidthMeasurer, TextMeasureCache, TextMeasurer};
pub use recording::{DrawOp, RecordingSurface};
pub use renderer::{HoverCellInfo, HoverTargets, RenderStats, ReorderOverlay, ViewportRenderer};
pub use surface::{BlitOptions, RenderSurface};

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasSurface, CanvasTextMeasurer};
