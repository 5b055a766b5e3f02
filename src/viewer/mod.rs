//! Main GridView struct - the engine a host binds to one surface.
//!
//! This module provides [`GridView`], which handles:
//! - Polling counts and arrangement from the [`ContentProvider`]
//! - Managing viewport state (first visible row/column, surface size)
//! - Coordinating layout, dirty tracking and the render pass
//! - Handling user interactions (pointer, wheel, keyboard)
//!
//! Deferred work (tooltip delay, overlay detach, drag auto-scroll) runs from
//! [`GridView::tick`], which the host calls from its event loop with a
//! monotonic timestamp. The engine never starts threads or timers.

mod autosize;
mod clipboard;
mod events;
pub mod input;
pub mod listener;
mod reorder;
mod scroll;
mod tooltip;

use std::time::Duration;

use tracing::debug;

use crate::config::GridConfig;
use crate::error::Result;
use crate::layout::{GridLayout, ResizeTarget, Viewport};
use crate::provider::ContentProvider;
use crate::render::renderer::RenderContext;
use crate::render::{
    FixedWidthMeasurer, HoverTargets, InvalidationTracker, RenderStats, RenderSurface, ReorderOverlay,
    TextMeasurer, ViewportRenderer,
};
use crate::selection::{self, SelectionModel};
use crate::types::{CellAddress, IntPoint, SelectionRect, SimpleCellAddress};

pub use clipboard::escape_cell_value;
pub use input::{Key, KeyInput, Modifiers, PointerButton};
pub use listener::{EventLog, GridEvent, GridListener, Tooltip, TooltipTarget};

use listener::deliver;
use tooltip::TooltipState;

/// Command names understood by the engine when the provider leaves them
/// unhandled.
pub mod commands {
    pub const SELECT_ALL: &str = "select-all";
    pub const ADJUST_COLUMN_SIZES: &str = "adjust-column-sizes";
    pub const TOGGLE_FLEXIBLE_ROWS: &str = "toggle-flexible-rows";
}

/// Pointer shape the host should show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub enum CursorHint {
    #[default]
    Default,
    ResizeColumn,
    ReorderColumn,
    NoDrop,
}

/// Which edges of the grid the pointer is past while dragging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

/// Left-button drag in progress.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DragState {
    /// Real address the press landed on, `EMPTY` when idle
    pub start: CellAddress,
    pub origin: IntPoint,
    pub behind: Edges,
    pub next_scroll: Duration,
}

impl DragState {
    fn is_active(&self) -> bool {
        !self.start.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ResizeDrag {
    pub target: ResizeTarget,
    pub origin_x: i32,
    pub start_size: i32,
}

/// Grid engine bound to one provider and one surface.
pub struct GridView<S: RenderSurface> {
    provider: Box<dyn ContentProvider>,
    surface: S,
    config: GridConfig,
    layout: GridLayout,
    viewport: Viewport,
    selection: SelectionModel,
    /// Real address; read through [`current_cell`](Self::current_cell)
    current: CellAddress,
    invalidation: InvalidationTracker,
    renderer: ViewportRenderer,
    hover: HoverTargets,
    drag: DragState,
    resize: Option<ResizeDrag>,
    tooltip: TooltipState,
    overlay_detach_due: Option<Duration>,
    cursor: CursorHint,
    /// Last timestamp seen by `tick`
    clock: Duration,
    flexible_rows: bool,
    listeners: Vec<Box<dyn GridListener>>,
    last_stats: RenderStats,
}

impl<S: RenderSurface> GridView<S> {
    pub fn new(provider: Box<dyn ContentProvider>, surface: S, config: GridConfig) -> Result<Self> {
        config.validate()?;
        let mut layout = GridLayout::new(config.effective_row_height(), config.effective_column_width());
        layout.set_header_width(config.header_width);
        layout.set_header_height(config.header_height);
        layout.set_resize_threshold(config.column_resize_threshold);
        layout.columns.set_max_size(config.max_column_width);

        let mut selection = SelectionModel::new();
        selection.set_can_select(config.can_select);

        let viewport = Viewport::new(surface.width(), surface.height());
        let renderer = ViewportRenderer::new(Box::new(FixedWidthMeasurer::default()), config.text_cache_capacity);

        let mut view = Self {
            provider,
            surface,
            flexible_rows: config.allow_flexible_rows,
            invalidation: InvalidationTracker::new(config.invalidation_threshold),
            config,
            layout,
            viewport,
            selection,
            current: CellAddress::EMPTY,
            renderer,
            hover: HoverTargets::default(),
            drag: DragState::default(),
            resize: None,
            tooltip: TooltipState::default(),
            overlay_detach_due: None,
            cursor: CursorHint::Default,
            clock: Duration::ZERO,
            listeners: Vec::new(),
            last_stats: RenderStats::default(),
        };
        view.update_series_counts();
        view.invalidation.invalidate_all();
        Ok(view)
    }

    // ------------------------------------------------------------------
    // Wiring
    // ------------------------------------------------------------------

    pub fn add_listener(&mut self, listener: Box<dyn GridListener>) {
        self.listeners.push(listener);
    }

    /// Replace the text measurer, e.g. with one backed by the surface.
    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.renderer.set_measurer(measurer);
        self.invalidation.invalidate_all();
    }

    /// Apply a new configuration and recompute layout.
    pub fn set_config(&mut self, config: GridConfig) -> Result<()> {
        config.validate()?;
        self.layout.rows.set_default_size(config.effective_row_height());
        self.layout.columns.set_default_size(config.effective_column_width());
        self.layout.columns.set_max_size(config.max_column_width);
        self.layout.set_header_width(config.header_width);
        self.layout.set_header_height(config.header_height);
        self.layout.set_resize_threshold(config.column_resize_threshold);
        self.layout.rows.ensure_index();
        self.layout.columns.ensure_index();
        self.invalidation.set_threshold(config.invalidation_threshold);
        self.selection.set_can_select(config.can_select);
        self.renderer.text_cache_mut().set_capacity(config.text_cache_capacity);
        let flexible_changed = self.flexible_rows != config.allow_flexible_rows;
        self.flexible_rows = config.allow_flexible_rows;
        self.config = config;
        if flexible_changed {
            self.recount_row_heights();
        }
        self.fix_scroll_position();
        self.invalidation.invalidate_all();
        Ok(())
    }

    /// Swap in a provider built elsewhere, e.g. by a background load.
    pub fn set_provider(&mut self, provider: Box<dyn ContentProvider>) {
        self.provider = provider;
        self.renderer.forget_hover_cell();
        self.notify_refresh();
    }

    /// Re-poll everything after the provider's content changed.
    pub fn notify_refresh(&mut self) {
        debug!(target: "gridview::viewer", "refresh");
        self.rearrange();
    }

    pub fn notify_row_arrangement_changed(&mut self) {
        debug!(target: "gridview::viewer", "row arrangement changed");
        self.rearrange();
    }

    pub fn notify_column_arrangement_changed(&mut self) {
        debug!(target: "gridview::viewer", "column arrangement changed");
        self.rearrange();
    }

    fn rearrange(&mut self) {
        self.invalidation.begin_scope();
        self.update_series_counts();
        self.fix_current_cell_and_selection();
        self.fix_scroll_position();
        self.invalidation.invalidate_all();
        self.invalidation.end_scope();
    }

    fn update_series_counts(&mut self) {
        let rows = self.provider.row_count();
        let columns = self.provider.column_count();
        self.layout.rows.set_count(rows);
        self.layout.columns.set_count(columns);
        self.layout
            .rows
            .set_extraordinary_indexes(self.provider.hidden_rows(), self.provider.frozen_rows());
        self.layout
            .columns
            .set_extraordinary_indexes(self.provider.hidden_columns(), self.provider.frozen_columns());
    }

    fn fix_current_cell_and_selection(&mut self) {
        self.current = self.layout.clamp_address(self.current);
        self.selection.clear();
        if let Some(cell) = self.current.as_simple() {
            self.selection.select_cell(cell);
        }
        self.notify_selection_changed(false);
    }

    /// Adapt to a new surface size.
    pub fn resize_surface(&mut self, width: i32, height: i32) -> Result<()> {
        self.surface.resize(width, height)?;
        self.viewport.width = width.max(0);
        self.viewport.height = height.max(0);
        self.fix_scroll_position();
        self.invalidation.invalidate_all();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Run one render pass over whatever is dirty.
    pub fn render(&mut self) -> RenderStats {
        self.layout.rows.ensure_index();
        self.layout.columns.ensure_index();
        let at_extreme = self.at_scroll_extreme();
        self.invalidation.promote(at_extreme);

        let ctx = RenderContext {
            layout: &self.layout,
            viewport: &self.viewport,
            config: &self.config,
            selection: &self.selection,
            current: self.current_cell(),
            hover: &self.hover,
            invalidation: &self.invalidation,
            provider: self.provider.as_ref(),
        };
        let stats = self.renderer.render(&ctx, &mut self.surface);
        self.invalidation.clear();
        self.invalidation.take_flush_request();
        self.provider.on_invalidating_finished();
        self.last_stats = stats;
        self.update_tooltip();
        stats
    }

    /// Render only if some invalidation asked for a flush.
    pub fn flush(&mut self) -> Option<RenderStats> {
        if self.invalidation.take_flush_request() {
            Some(self.render())
        } else {
            None
        }
    }

    /// Drive deferred work. `now` is a monotonic time since any fixed
    /// epoch chosen by the host.
    pub fn tick(&mut self, now: Duration) {
        self.clock = now;
        if self.overlay_detach_due.is_some_and(|due| now >= due) {
            self.overlay_detach_due = None;
            self.renderer.set_overlay(None);
            self.invalidation.invalidate_all();
        }
        self.tick_tooltip(now);
        if self.drag.is_active() && now >= self.drag.next_scroll {
            self.drag.next_scroll = now + Duration::from_millis(self.config.drag_scroll_interval_ms);
            self.drag_scroll_step();
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn ContentProvider {
        self.provider.as_mut()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn invalidation(&self) -> &InvalidationTracker {
        &self.invalidation
    }

    pub fn invalidation_mut(&mut self) -> &mut InvalidationTracker {
        &mut self.invalidation
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Selected rectangle in real coordinates.
    pub fn selection_rect(&self) -> Option<SelectionRect> {
        self.selection.rect()
    }

    pub fn hover(&self) -> &HoverTargets {
        &self.hover
    }

    pub fn overlay(&self) -> Option<ReorderOverlay> {
        self.renderer.overlay()
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn last_render_stats(&self) -> RenderStats {
        self.last_stats
    }

    pub fn flexible_rows(&self) -> bool {
        self.flexible_rows
    }

    pub fn set_flexible_rows(&mut self, flexible: bool) {
        if self.flexible_rows != flexible {
            self.flexible_rows = flexible;
            self.recount_row_heights();
            self.fix_scroll_position();
            self.invalidation.invalidate_all();
        }
    }

    /// Current cell in real coordinates; `EMPTY` while selection is off.
    pub fn current_cell(&self) -> CellAddress {
        if self.config.can_select {
            self.current
        } else {
            CellAddress::EMPTY
        }
    }

    pub fn current_model_cell(&self) -> CellAddress {
        self.layout.real_to_model(self.current_cell())
    }

    // ------------------------------------------------------------------
    // Current cell and selection
    // ------------------------------------------------------------------

    fn invalidate_current_cell(&mut self) {
        let current = self.current_cell();
        if let (Some(row), Some(column)) = (current.row, current.column) {
            self.invalidation.invalidate_cell(row, column);
        }
        if let Some(column) = current.column {
            self.invalidation.invalidate_column_header(column);
        }
        if let Some(row) = current.row {
            self.invalidation.invalidate_row_header(row);
        }
    }

    /// Move the current cell without touching the selection. A header
    /// address keeps the other axis of an existing current cell.
    fn place_current_cell(&mut self, mut cell: CellAddress) {
        if cell.is_row_header() && self.current.is_cell() {
            cell = cell.with_column(self.current.column);
        }
        if cell.is_column_header() && self.current.is_cell() {
            cell = cell.with_row(self.current.row);
        }
        self.invalidation.begin_scope();
        self.invalidate_current_cell();
        self.current = cell;
        self.invalidate_current_cell();
        self.invalidation.end_scope();
    }

    /// Clamp `(row, column)` into range, select it as a 1x1 rect and scroll
    /// it into view.
    pub fn move_current_cell(&mut self, row: Option<u32>, column: Option<u32>) -> bool {
        let clamp = |index: Option<u32>, count: u32| index.and_then(|i| count.checked_sub(1).map(|last| i.min(last)));
        self.invalidation.begin_scope();
        self.invalidation.invalidate_all();
        self.selection.clear();
        self.invalidate_current_cell();
        self.current = CellAddress::new(
            clamp(row, self.layout.rows.real_count()),
            clamp(column, self.layout.columns.real_count()),
        );
        if let Some(cell) = self.current.as_simple() {
            self.selection.select_cell(cell);
        }
        self.invalidate_current_cell();
        self.scroll_current_cell_into_view();
        self.invalidation.end_scope();
        self.notify_selection_changed(true);
        true
    }

    pub fn set_current_cell(&mut self, address: CellAddress) {
        self.move_current_cell(address.row, address.column);
    }

    pub fn set_current_model_cell(&mut self, address: CellAddress) {
        let real = self.layout.model_to_real(address);
        self.move_current_cell(real.row, real.column);
    }

    /// Select one cell, a whole row (no column) or a whole column (no row).
    pub fn select_cell(&mut self, row: Option<u32>, column: Option<u32>) {
        self.selection.clear();
        match (row, column) {
            (None, None) => {}
            (None, Some(column)) => self.selection.select_column(column, self.layout.rows.real_count()),
            (Some(row), None) => self.selection.select_row(row, self.layout.columns.real_count()),
            (Some(row), Some(column)) => self.selection.select_cell(SimpleCellAddress::new(row, column)),
        }
        self.place_current_cell(CellAddress::new(row, column));
        self.notify_selection_changed(true);
        self.scroll_current_cell_into_view();
        self.invalidation.invalidate_all();
    }

    pub fn select_rect(&mut self, rect: Option<SelectionRect>) {
        self.selection.clear();
        match rect {
            Some(rect) => {
                self.selection.select_rect(rect);
                self.place_current_cell(rect.from().into());
            }
            None => self.place_current_cell(CellAddress::EMPTY),
        }
        self.notify_selection_changed(true);
        self.scroll_current_cell_into_view();
        self.invalidation.invalidate_all();
    }

    /// Select everything below the frozen rows, through the command hook.
    pub fn select_all(&mut self) {
        self.handle_command(CellAddress::EMPTY, commands::SELECT_ALL);
    }

    fn do_select_all(&mut self) {
        let Some((rect, start)) = selection::select_all_rect(&self.layout) else {
            return;
        };
        self.selection.select_rect(rect);
        self.place_current_cell(start.into());
        self.invalidation.invalidate_all();
        self.notify_selection_changed(true);
    }

    /// Route a block command: the provider first, then the built-in
    /// commands, then listeners. Returns whether anything handled it.
    pub fn handle_command(&mut self, address: CellAddress, command: &str) -> bool {
        let model = self.layout.real_to_model(address);
        if self.provider.handle_command(model, command) {
            return true;
        }
        match command {
            commands::TOGGLE_FLEXIBLE_ROWS => {
                let flexible = !self.flexible_rows;
                self.set_flexible_rows(flexible);
            }
            commands::SELECT_ALL => self.do_select_all(),
            commands::ADJUST_COLUMN_SIZES => {
                self.recount_column_widths_logged();
                self.fix_scroll_position();
                self.invalidation.invalidate_all();
            }
            _ => {
                self.emit(GridEvent::Command {
                    address: model,
                    command: command.to_string(),
                });
                return false;
            }
        }
        true
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    fn emit(&mut self, event: GridEvent) {
        for listener in &mut self.listeners {
            deliver(listener.as_mut(), &event);
        }
    }

    fn notify_selection_changed(&mut self, user: bool) {
        let rect = self.selection.rect();
        self.provider.on_selection_changed(rect);
        self.emit(GridEvent::SelectionChanged { selection: rect, user });
    }
}
