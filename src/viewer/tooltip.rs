//! Delayed tooltips for cells and active regions.

use std::time::Duration;

use tracing::trace;

use super::{GridEvent, GridView, Tooltip, TooltipTarget};
use crate::render::RenderSurface;
use crate::types::TooltipVisibility;

#[derive(Debug, Clone, Default)]
pub(crate) struct TooltipState {
    pending: Option<Tooltip>,
    due: Option<Duration>,
    shown: bool,
}

impl<S: RenderSurface> GridView<S> {
    /// Tooltip waiting for its delay or already shown.
    pub fn pending_tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.pending.as_ref()
    }

    pub fn tooltip_shown(&self) -> bool {
        self.tooltip.shown
    }

    /// Pick the tooltip for whatever is under the pointer. Needs the hover
    /// measurements of the last render pass.
    pub(crate) fn update_tooltip(&mut self) {
        let Some(pt) = self.hover.pointer else {
            self.hide_tooltip();
            return;
        };
        let cell = self.hover.cell;
        let found = self.renderer.hover_cell(cell).and_then(|info| {
            let mut regions = info.regions.iter().enumerate();
            match regions.find(|(_, r)| r.rect.contains(pt)) {
                Some((index, region)) => region.tooltip.clone().map(|text| Tooltip {
                    target: TooltipTarget::Region { cell, region: index },
                    text,
                }),
                None => {
                    let visible = info.tooltip_visibility == TooltipVisibility::Always || info.trimmed;
                    info.tooltip.clone().filter(|_| visible).map(|text| Tooltip {
                        target: TooltipTarget::Cell(cell),
                        text,
                    })
                }
            }
        });
        match found {
            Some(tooltip) => self.show_tooltip(tooltip),
            None => self.hide_tooltip(),
        }
    }

    fn show_tooltip(&mut self, tooltip: Tooltip) {
        if self.tooltip.pending.as_ref() == Some(&tooltip) {
            return;
        }
        self.hide_tooltip();
        trace!(target: "gridview::tooltip", text = %tooltip.text, "tooltip pending");
        self.tooltip.pending = Some(tooltip);
        self.tooltip.due = Some(self.clock + Duration::from_millis(self.config.tooltip_delay_ms));
    }

    pub(crate) fn hide_tooltip(&mut self) {
        let was_shown = self.tooltip.shown;
        self.tooltip = TooltipState::default();
        if was_shown {
            self.emit(GridEvent::Tooltip(None));
        }
    }

    pub(crate) fn tick_tooltip(&mut self, now: Duration) {
        if self.tooltip.shown || !self.tooltip.due.is_some_and(|due| now >= due) {
            return;
        }
        self.tooltip.due = None;
        if let Some(tooltip) = self.tooltip.pending.clone() {
            self.tooltip.shown = true;
            self.emit(GridEvent::Tooltip(Some(tooltip)));
        }
    }
}
