//! Viewport renderer.
//!
//! One pass walks the visible regions in a fixed order: grid header, frozen
//! corner, frozen rows, frozen columns, scrollable cells, then row headers
//! and column headers. Headers come last so they cover anything that bled
//! past the frozen boundary. A drag-reorder overlay, when present, is drawn
//! after everything else.
//!
//! Which entries are drawn is decided by the [`InvalidationTracker`]; when
//! nothing is dirty the pass repaints everything.

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::color::{palette, Rgb};
use crate::config::GridConfig;
use crate::error::Result;
use crate::layout::{GridLayout, Viewport};
use crate::provider::ContentProvider;
use crate::render::cell_layout::{self, ActiveRegion, HoverState, LayoutParams, PlacedContent};
use crate::render::invalidation::InvalidationTracker;
use crate::render::measure::{TextMeasureCache, TextMeasurer};
use crate::render::surface::{BlitOptions, RenderSurface};
use crate::selection::SelectionModel;
use crate::types::{
    CellAddress, CellDecoration, CellDescriptor, FontSpec, IntPoint, IntRect, TooltipVisibility,
};

/// What the pointer is over, in real indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverTargets {
    pub cell: CellAddress,
    pub row: Option<u32>,
    pub column: Option<u32>,
    pub row_header: Option<u32>,
    pub column_header: Option<u32>,
    pub pointer: Option<IntPoint>,
}

/// Transient column drag-reorder indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderOverlay {
    /// Real column being dragged
    pub column: u32,
    /// Real column the drop would land before; `None` hides the marker
    pub target: Option<u32>,
}

/// What one pass drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    pub full_repaint: bool,
    pub cells: u32,
    pub row_headers: u32,
    pub column_headers: u32,
    pub grid_header: bool,
    pub provider_errors: u32,
    pub overlay: bool,
}

/// Measurements of the hovered cell from the last pass that drew it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoverCellInfo {
    pub address: CellAddress,
    pub trimmed: bool,
    pub regions: Vec<ActiveRegion>,
    pub tooltip: Option<String>,
    pub tooltip_visibility: TooltipVisibility,
}

/// Engine state a pass reads.
pub struct RenderContext<'a> {
    pub layout: &'a GridLayout,
    pub viewport: &'a Viewport,
    pub config: &'a GridConfig,
    pub selection: &'a SelectionModel,
    /// Current cell in real coordinates, `EMPTY` when there is none
    pub current: CellAddress,
    pub hover: &'a HoverTargets,
    pub invalidation: &'a InvalidationTracker,
    pub provider: &'a dyn ContentProvider,
}

/// Colors a painted entry needs besides its descriptor.
struct Paint {
    background: Rgb,
    text_override: Option<Rgb>,
}

pub struct ViewportRenderer {
    measurer: Box<dyn TextMeasurer>,
    cache: TextMeasureCache,
    overlay: Option<ReorderOverlay>,
    hover_cell: HoverCellInfo,
}

impl ViewportRenderer {
    pub fn new(measurer: Box<dyn TextMeasurer>, cache_capacity: usize) -> Self {
        Self {
            measurer,
            cache: TextMeasureCache::new(cache_capacity),
            overlay: None,
            hover_cell: HoverCellInfo::default(),
        }
    }

    pub fn set_measurer(&mut self, measurer: Box<dyn TextMeasurer>) {
        self.measurer = measurer;
        self.cache.clear();
    }

    pub fn measurer(&self) -> &dyn TextMeasurer {
        self.measurer.as_ref()
    }

    pub fn text_cache(&self) -> &TextMeasureCache {
        &self.cache
    }

    pub fn text_cache_mut(&mut self) -> &mut TextMeasureCache {
        &mut self.cache
    }

    pub fn overlay(&self) -> Option<ReorderOverlay> {
        self.overlay
    }

    pub fn set_overlay(&mut self, overlay: Option<ReorderOverlay>) {
        self.overlay = overlay;
    }

    /// Hover measurements, if the last pass that drew `address` saw it
    /// hovered.
    pub fn hover_cell(&self, address: CellAddress) -> Option<&HoverCellInfo> {
        (self.hover_cell.address == address && !address.is_empty()).then_some(&self.hover_cell)
    }

    pub fn forget_hover_cell(&mut self) {
        self.hover_cell = HoverCellInfo::default();
    }

    /// Width the blocks of `descriptor` need.
    pub fn content_width(&mut self, descriptor: &CellDescriptor, font: &FontSpec, block_padding: i32) -> i32 {
        cell_layout::content_width(descriptor, font, block_padding, self.measurer.as_ref(), &mut self.cache)
    }

    pub fn content_height(&self, descriptor: &CellDescriptor, font: &FontSpec) -> i32 {
        cell_layout::content_height(descriptor, font, self.measurer.as_ref())
    }

    /// Run one pass against `surface`.
    pub fn render<S: RenderSurface + ?Sized>(&mut self, ctx: &RenderContext<'_>, surface: &mut S) -> RenderStats {
        let inv = ctx.invalidation;
        let layout = ctx.layout;
        let mut stats = RenderStats {
            full_repaint: inv.needs_clear(),
            ..RenderStats::default()
        };
        if stats.full_repaint {
            debug!(target: "gridview::render", "full repaint");
            surface.clear(ctx.config.colors.background);
        }

        if inv.should_draw_grid_header() {
            self.draw_grid_header(ctx, surface, &mut stats);
        }

        let frozen_rows = 0..layout.rows.frozen_count();
        let frozen_columns = 0..layout.columns.frozen_count();
        let scroll_rows = layout.visible_scroll_rows(ctx.viewport);
        let scroll_columns = layout.visible_scroll_columns(ctx.viewport);

        let regions = [
            (frozen_rows.clone(), frozen_columns.clone()),
            (frozen_rows.clone(), scroll_columns.clone()),
            (scroll_rows.clone(), frozen_columns.clone()),
            (scroll_rows.clone(), scroll_columns.clone()),
        ];
        for (rows, columns) in regions {
            for row in rows {
                for column in columns.clone() {
                    if inv.should_draw_cell(row, column) {
                        self.draw_cell(ctx, surface, row, column, &mut stats);
                    }
                }
            }
        }

        for row in frozen_rows.chain(scroll_rows) {
            if inv.should_draw_row_header(row) {
                self.draw_row_header(ctx, surface, row, &mut stats);
            }
        }
        for column in frozen_columns.chain(scroll_columns) {
            if inv.should_draw_column_header(column) {
                self.draw_column_header(ctx, surface, column, &mut stats);
            }
        }

        if let Some(overlay) = self.overlay {
            draw_overlay(ctx, surface, overlay);
            stats.overlay = true;
        }

        if let Err(e) = surface.present() {
            warn!(target: "gridview::render", error = %e, "surface present failed");
        }
        trace!(
            target: "gridview::render",
            cells = stats.cells,
            row_headers = stats.row_headers,
            column_headers = stats.column_headers,
            "render pass done"
        );
        stats
    }

    fn draw_grid_header<S: RenderSurface + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        surface: &mut S,
        stats: &mut RenderStats,
    ) {
        let descriptor = descriptor_or_empty(ctx.provider.grid_header(), CellAddress::GRID_HEADER, stats);
        let paint = Paint {
            background: ctx.config.colors.header_background,
            text_override: None,
        };
        self.paint(ctx, surface, &descriptor, ctx.layout.grid_header_rect(), &paint, CellAddress::GRID_HEADER);
        stats.grid_header = true;
    }

    fn draw_cell<S: RenderSurface + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        surface: &mut S,
        row: u32,
        column: u32,
        stats: &mut RenderStats,
    ) {
        let (Some(model_row), Some(model_column)) = (
            ctx.layout.rows.real_to_model(row),
            ctx.layout.columns.real_to_model(column),
        ) else {
            return;
        };
        let address = CellAddress::cell(row, column);
        let descriptor = descriptor_or_empty(ctx.provider.cell(model_row, model_column), address, stats);

        let colors = &ctx.config.colors;
        let selected = ctx.current.test_cell(row, column) || ctx.selection.contains(row, column);
        let hovered = ctx.config.enable_mouse_hover_cell_background
            && (ctx.hover.row == Some(row) || ctx.hover.column == Some(column));
        let background = if selected {
            colors.selected
        } else if hovered {
            colors.mouse_over_row
        } else {
            descriptor.background.unwrap_or(match colors.alternate_background {
                Some(alternate) if row % 2 == 1 => alternate,
                _ => colors.background,
            })
        };
        let paint = Paint {
            background,
            text_override: selected.then_some(colors.selected_text),
        };
        let rect = ctx.layout.cell_rect(ctx.viewport, row, column);
        self.paint(ctx, surface, &descriptor, rect, &paint, address);
        stats.cells += 1;
    }

    fn draw_row_header<S: RenderSurface + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        surface: &mut S,
        row: u32,
        stats: &mut RenderStats,
    ) {
        let Some(model_row) = ctx.layout.rows.real_to_model(row) else {
            return;
        };
        let address = CellAddress::row_header(row);
        let descriptor = descriptor_or_empty(ctx.provider.row_header(model_row), address, stats);
        let paint = header_paint(ctx, &descriptor, ctx.hover.row_header == Some(row), ctx.current.row == Some(row));
        let rect = ctx.layout.row_header_rect(ctx.viewport, row);
        self.paint(ctx, surface, &descriptor, rect, &paint, address);
        stats.row_headers += 1;
    }

    fn draw_column_header<S: RenderSurface + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        surface: &mut S,
        column: u32,
        stats: &mut RenderStats,
    ) {
        let Some(model_column) = ctx.layout.columns.real_to_model(column) else {
            return;
        };
        let address = CellAddress::column_header(column);
        let descriptor = descriptor_or_empty(ctx.provider.column_header(model_column), address, stats);
        let paint = header_paint(
            ctx,
            &descriptor,
            ctx.hover.column_header == Some(column),
            ctx.current.column == Some(column),
        );
        let rect = ctx.layout.column_header_rect(ctx.viewport, column);
        self.paint(ctx, surface, &descriptor, rect, &paint, address);
        stats.column_headers += 1;
    }

    fn paint<S: RenderSurface + ?Sized>(
        &mut self,
        ctx: &RenderContext<'_>,
        surface: &mut S,
        descriptor: &CellDescriptor,
        rect: IntRect,
        paint: &Paint,
        address: CellAddress,
    ) {
        let config = ctx.config;
        let colors = &config.colors;
        let is_hover_cell = !address.is_empty() && address == ctx.hover.cell;

        surface.draw_rect(rect, colors.grid_line);
        surface.fill_rect(rect.grow_symmetrical(-1, -1), paint.background);

        let params = LayoutParams {
            font: &config.font,
            padding_horizontal: config.cell_padding_horizontal,
            padding_vertical: config.cell_padding_vertical,
            block_padding: config.block_padding,
            line_height: config.line_height,
        };
        let hover = HoverState {
            is_hover_cell,
            pointer: ctx.hover.pointer,
        };
        let placed = cell_layout::layout_cell(descriptor, rect, &params, hover, self.measurer.as_ref(), &mut self.cache);

        for block in &placed.blocks {
            if let Some(region) = &block.region {
                if region.hovered {
                    surface.fill_rect(region.rect, colors.active_region_hover_fill);
                }
                if region.show_frame {
                    surface.draw_rect(region.rect, colors.active_region_frame);
                }
            }
            match &block.content {
                PlacedContent::Text { lines, font, color } => {
                    let color = paint.text_override.or(*color).unwrap_or(colors.cell_font);
                    for (origin, text) in lines {
                        surface.draw_text(*origin, placed.content_rect, color, font, text);
                    }
                }
                PlacedContent::Image { dest, source, size } => {
                    let src = IntRect::from_xywh(0, 0, size.width, size.height);
                    if let Err(e) = surface.blit_image(*dest, source, src, BlitOptions::default()) {
                        warn!(target: "gridview::render", %source, error = %e, "image blit failed");
                    }
                }
            }
        }

        if descriptor.decoration == CellDecoration::StrikeOutHorizontal {
            let y = rect.top + rect.height / 2;
            surface.draw_line(
                IntPoint::new(rect.left, y),
                IntPoint::new(rect.right(), y),
                descriptor.decoration_color.unwrap_or(palette::DECORATION),
            );
        }

        if is_hover_cell {
            self.hover_cell = HoverCellInfo {
                address,
                trimmed: placed.trimmed,
                regions: placed.active_regions().cloned().collect(),
                tooltip: descriptor.tooltip.clone(),
                tooltip_visibility: descriptor.tooltip_visibility,
            };
        }
    }
}

fn descriptor_or_empty(result: Result<CellDescriptor>, address: CellAddress, stats: &mut RenderStats) -> CellDescriptor {
    result.unwrap_or_else(|e| {
        warn!(target: "gridview::render", %address, error = %e, "content provider failed, drawing empty cell");
        stats.provider_errors += 1;
        CellDescriptor::empty()
    })
}

fn header_paint(ctx: &RenderContext<'_>, descriptor: &CellDescriptor, hovered: bool, current: bool) -> Paint {
    let colors = &ctx.config.colors;
    let background = if hovered {
        colors.mouse_over_row
    } else if current {
        colors.header_current_background
    } else {
        descriptor.background.unwrap_or(colors.header_background)
    };
    Paint {
        background,
        text_override: None,
    }
}

fn draw_overlay<S: RenderSurface + ?Sized>(ctx: &RenderContext<'_>, surface: &mut S, overlay: ReorderOverlay) {
    let layout = ctx.layout;
    let vp = ctx.viewport;
    let indicator = ctx.config.colors.reorder_indicator;
    if overlay.column < layout.columns.real_count() {
        let header = layout.column_header_rect(vp, overlay.column);
        surface.draw_rect(header, indicator.lighten(0.4));
        surface.draw_rect(header.grow_symmetrical(-1, -1), indicator.lighten(0.7));
    }
    let Some(target) = overlay.target else {
        return;
    };
    let count = layout.columns.real_count();
    let x = match count.checked_sub(1) {
        Some(last) if target > last => {
            layout.column_left(vp, last) + layout.columns.get_size_by_real_index(last)
        }
        Some(_) => layout.column_left(vp, target),
        None => return,
    };
    let bottom = vp.height;
    surface.draw_line(IntPoint::new(x, 0), IntPoint::new(x, bottom), indicator);
    surface.draw_line(IntPoint::new(x + 1, 0), IntPoint::new(x + 1, bottom), indicator.darken(0.3));
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::provider::TableProvider;
    use crate::render::measure::FixedWidthMeasurer;
    use crate::render::recording::{DrawOp, RecordingSurface};

    struct Fixture {
        layout: GridLayout,
        viewport: Viewport,
        config: GridConfig,
        selection: SelectionModel,
        hover: HoverTargets,
        invalidation: InvalidationTracker,
        provider: TableProvider,
    }

    impl Fixture {
        fn new(rows: u32, columns: u32) -> Self {
            let config = GridConfig::default();
            let mut layout = GridLayout::new(20, 80);
            layout.set_header_height(20);
            layout.rows.set_count(rows);
            layout.columns.set_count(columns);
            Self {
                layout,
                viewport: Viewport::new(400, 200),
                config,
                selection: SelectionModel::new(),
                hover: HoverTargets::default(),
                invalidation: InvalidationTracker::default(),
                provider: TableProvider::synthetic(rows, columns),
            }
        }

        fn render(&self, renderer: &mut ViewportRenderer, current: CellAddress) -> (RenderStats, RecordingSurface) {
            let ctx = RenderContext {
                layout: &self.layout,
                viewport: &self.viewport,
                config: &self.config,
                selection: &self.selection,
                current,
                hover: &self.hover,
                invalidation: &self.invalidation,
                provider: &self.provider,
            };
            let mut surface = RecordingSurface::new(self.viewport.width, self.viewport.height);
            let stats = renderer.render(&ctx, &mut surface);
            (stats, surface)
        }
    }

    fn renderer() -> ViewportRenderer {
        ViewportRenderer::new(Box::new(FixedWidthMeasurer::default()), 256)
    }

    #[test]
    fn test_full_pass_draws_visible_region() {
        let f = Fixture::new(100, 10);
        let (stats, surface) = f.render(&mut renderer(), CellAddress::EMPTY);
        assert!(stats.full_repaint);
        assert_eq!(surface.clear_count(), 1);
        // 180 px of scroll area at 20 px rows, 360 px at 80 px columns
        assert_eq!(stats.row_headers, 9);
        assert_eq!(stats.column_headers, 5);
        assert_eq!(stats.cells, 45);
        assert!(stats.grid_header);
        assert!(surface.texts().contains(&"R0C0"));
    }

    #[test]
    fn test_headers_drawn_after_cells() {
        let f = Fixture::new(5, 3);
        let (_, surface) = f.render(&mut renderer(), CellAddress::EMPTY);
        let texts = surface.texts();
        let last_cell = texts.iter().rposition(|t| t.starts_with('R')).unwrap();
        let first_row_header = texts.iter().position(|t| *t == "1").unwrap();
        let first_column_header = texts.iter().position(|t| *t == "Column 1").unwrap();
        assert!(last_cell < first_row_header);
        assert!(first_row_header < first_column_header);
    }

    #[test]
    fn test_partial_pass_draws_only_dirty_row() {
        let mut f = Fixture::new(100, 10);
        f.invalidation.invalidate_row(3);
        let (stats, surface) = f.render(&mut renderer(), CellAddress::EMPTY);
        assert!(!stats.full_repaint);
        assert_eq!(surface.clear_count(), 0);
        assert_eq!(stats.cells, 5);
        assert_eq!(stats.row_headers, 1);
        assert_eq!(stats.column_headers, 0);
        assert!(!stats.grid_header);
    }

    #[test]
    fn test_selected_cell_colors() {
        let mut f = Fixture::new(4, 2);
        f.invalidation.invalidate_cell(1, 1);
        let (_, surface) = f.render(&mut renderer(), CellAddress::cell(1, 1));
        let selected = f.config.colors.selected;
        assert!(surface
            .ops()
            .iter()
            .any(|op| matches!(op, DrawOp::FillRect { color, .. } if *color == selected)));
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            DrawOp::Text { text, color, .. } if text == "R1C1" && *color == f.config.colors.selected_text
        )));
    }

    #[test]
    fn test_hidden_and_frozen_rows_use_model_indices() {
        let mut f = Fixture::new(10, 2);
        f.layout.rows.set_extraordinary_indexes([1], [5]);
        let (_, surface) = f.render(&mut renderer(), CellAddress::EMPTY);
        let texts = surface.texts();
        assert!(!texts.contains(&"R1C0"));
        // frozen model row 5 is drawn first
        let first = texts.iter().position(|t| t.starts_with('R')).unwrap();
        assert_eq!(texts[first], "R5C0");
    }

    struct Failing;

    impl ContentProvider for Failing {
        fn row_count(&self) -> u32 {
            3
        }
        fn column_count(&self) -> u32 {
            1
        }
        fn cell(&self, row: u32, _column: u32) -> Result<CellDescriptor> {
            if row == 1 {
                Err("boom".into())
            } else {
                Ok(CellDescriptor::text(format!("ok{row}")))
            }
        }
    }

    #[test]
    fn test_provider_error_renders_empty_cell() {
        let f = Fixture::new(3, 1);
        let ctx = RenderContext {
            layout: &f.layout,
            viewport: &f.viewport,
            config: &f.config,
            selection: &f.selection,
            current: CellAddress::EMPTY,
            hover: &f.hover,
            invalidation: &f.invalidation,
            provider: &Failing,
        };
        let mut surface = RecordingSurface::new(400, 200);
        let stats = renderer().render(&ctx, &mut surface);
        assert_eq!(stats.provider_errors, 1);
        assert_eq!(stats.cells, 3);
        assert!(surface.texts().contains(&"ok2"));
    }

    #[test]
    fn test_hover_cell_records_trim() {
        let mut f = Fixture::new(2, 1);
        f.provider.set_value(0, 0, "a rather long value").unwrap();
        f.hover.cell = CellAddress::cell(0, 0);
        let mut r = renderer();
        f.render(&mut r, CellAddress::EMPTY);
        let info = r.hover_cell(CellAddress::cell(0, 0)).unwrap();
        assert!(info.trimmed);
        assert!(r.hover_cell(CellAddress::cell(1, 0)).is_none());
    }

    #[test]
    fn test_overlay_pass() {
        let f = Fixture::new(2, 3);
        let mut r = renderer();
        r.set_overlay(Some(ReorderOverlay {
            column: 0,
            target: Some(2),
        }));
        let (stats, surface) = f.render(&mut r, CellAddress::EMPTY);
        assert!(stats.overlay);
        let x = f.layout.column_left(&f.viewport, 2);
        assert!(surface.ops().iter().any(|op| matches!(
            op,
            DrawOp::Line { from, .. } if from.x == x
        )));
    }
}
