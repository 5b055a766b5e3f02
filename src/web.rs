//! Browser binding: a [`GridView`] over a canvas, driven from JavaScript.
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmGrid } from 'gridview';
//! await init();
//! const grid = new WasmGrid(canvas, null);
//! grid.setData(["Id", "Name"], [["1", "Ada"], ["2", "Grace"]]);
//! grid.setEventCallback((event) => console.log(event));
//! canvas.addEventListener('mousedown', (e) => grid.onMouseDown(e.offsetX, e.offsetY, e.button, e.ctrlKey, e.shiftKey));
//! requestAnimationFrame(function frame(t) { grid.tick(t); requestAnimationFrame(frame); });
//! ```
//!
//! Every handler flushes pending invalidation before returning and then
//! forwards the events it produced to the registered callback.

use std::time::Duration;

use js_sys::Function;
use serde::Deserialize;
use tracing::warn;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlImageElement};

use crate::config::GridConfig;
use crate::provider::TableProvider;
use crate::render::{CanvasSurface, RenderSurface};
use crate::types::{CellAddress, IntPoint};
use crate::viewer::{EventLog, GridView, Key, KeyInput, Modifiers, PointerButton};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Arrangement {
    #[serde(default)]
    frozen_rows: Vec<u32>,
    #[serde(default)]
    frozen_columns: Vec<u32>,
    #[serde(default)]
    hidden_rows: Vec<u32>,
    #[serde(default)]
    hidden_columns: Vec<u32>,
    #[serde(default)]
    column_reorder: bool,
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmGrid {
    view: GridView<CanvasSurface>,
    events: EventLog,
    callback: Option<Function>,
}

#[wasm_bindgen]
impl WasmGrid {
    /// Bind to a canvas. `config` is an optional JSON string.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config: Option<String>) -> Result<WasmGrid, JsValue> {
        console_error_panic_hook::set_once();
        let config = match config {
            Some(json) => GridConfig::from_json(&json)?,
            None => GridConfig::default(),
        };
        let surface = CanvasSurface::new(canvas)?;
        let measurer = surface.measurer();
        let mut view = GridView::new(Box::new(TableProvider::default()), surface, config)?;
        view.set_measurer(Box::new(measurer));
        let events = EventLog::new();
        view.add_listener(Box::new(events.clone()));
        Ok(WasmGrid {
            view,
            events,
            callback: None,
        })
    }

    /// Replace the content. `headers` is an array of strings and `rows` an
    /// array of string arrays; `arrangement` may carry `frozenRows`,
    /// `frozenColumns`, `hiddenRows`, `hiddenColumns` and `columnReorder`.
    #[wasm_bindgen(js_name = "setData")]
    pub fn set_data(&mut self, headers: JsValue, rows: JsValue, arrangement: JsValue) -> Result<(), JsValue> {
        let headers: Vec<String> = serde_wasm_bindgen::from_value(headers).map_err(js_err)?;
        let rows: Vec<Vec<String>> = serde_wasm_bindgen::from_value(rows).map_err(js_err)?;
        let arrangement: Arrangement = if arrangement.is_undefined() || arrangement.is_null() {
            Arrangement::default()
        } else {
            serde_wasm_bindgen::from_value(arrangement).map_err(js_err)?
        };
        let provider = TableProvider::new(headers, rows)
            .with_frozen_rows(arrangement.frozen_rows)
            .with_frozen_columns(arrangement.frozen_columns)
            .with_hidden_rows(arrangement.hidden_rows)
            .with_hidden_columns(arrangement.hidden_columns)
            .with_column_reorder(arrangement.column_reorder);
        self.view.set_provider(Box::new(provider));
        self.finish();
        Ok(())
    }

    #[wasm_bindgen(js_name = "setConfig")]
    pub fn set_config(&mut self, json: &str) -> Result<(), JsValue> {
        self.view.set_config(GridConfig::from_json(json)?)?;
        self.finish();
        Ok(())
    }

    #[wasm_bindgen(js_name = "setEventCallback")]
    pub fn set_event_callback(&mut self, callback: Option<Function>) {
        self.callback = callback;
    }

    /// Register an image that cell blocks refer to by `key`.
    #[wasm_bindgen(js_name = "registerImage")]
    pub fn register_image(&mut self, key: &str, image: HtmlImageElement) {
        self.view.surface_mut().register_image(key, image);
        self.view.invalidation_mut().invalidate_all();
        self.finish();
    }

    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), JsValue> {
        self.view.resize_surface(width, height)?;
        self.finish();
        Ok(())
    }

    /// Full repaint.
    pub fn render(&mut self) {
        self.view.invalidation_mut().invalidate_all();
        self.view.render();
        self.forward_events();
    }

    /// Drive deferred work with a `performance.now()` timestamp.
    pub fn tick(&mut self, now_ms: f64) {
        let Ok(now) = Duration::try_from_secs_f64(now_ms / 1000.0) else {
            return;
        };
        self.view.tick(now);
        self.finish();
    }

    #[wasm_bindgen(js_name = "onMouseDown")]
    pub fn on_mouse_down(&mut self, x: i32, y: i32, button: i16, ctrl: bool, shift: bool) {
        let Some(button) = PointerButton::from_dom(button) else {
            return;
        };
        let modifiers = Modifiers {
            ctrl,
            shift,
            alt: false,
        };
        self.view.pointer_down(IntPoint::new(x, y), button, modifiers);
        self.finish();
    }

    #[wasm_bindgen(js_name = "onMouseMove")]
    pub fn on_mouse_move(&mut self, x: i32, y: i32) {
        self.view.pointer_move(IntPoint::new(x, y));
        self.finish();
    }

    #[wasm_bindgen(js_name = "onMouseUp")]
    pub fn on_mouse_up(&mut self, x: i32, y: i32, button: i16) {
        if let Some(button) = PointerButton::from_dom(button) {
            self.view.pointer_up(IntPoint::new(x, y), button);
            self.finish();
        }
    }

    #[wasm_bindgen(js_name = "onDoubleClick")]
    pub fn on_double_click(&mut self, x: i32, y: i32) {
        self.view.double_click(IntPoint::new(x, y));
        self.finish();
    }

    #[wasm_bindgen(js_name = "onMouseLeave")]
    pub fn on_mouse_leave(&mut self) {
        self.view.pointer_leave();
        self.finish();
    }

    #[wasm_bindgen(js_name = "onWheel")]
    pub fn on_wheel(&mut self, delta_y: f64, ctrl: bool) {
        let modifiers = Modifiers {
            ctrl,
            ..Modifiers::NONE
        };
        self.view.wheel(delta_y, modifiers);
        self.finish();
    }

    /// Returns whether the key was consumed, so the host can call
    /// `preventDefault`.
    #[wasm_bindgen(js_name = "onKeyDown")]
    pub fn on_key_down(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        let Some(key) = Key::from_dom(key) else {
            return false;
        };
        let handled = self.view.key_down(KeyInput::new(key, Modifiers { ctrl, shift, alt }));
        self.finish();
        handled
    }

    #[wasm_bindgen(js_name = "scrollTo")]
    pub fn scroll_to(&mut self, first_row: u32, first_column: u32) {
        self.view.scroll_to(first_row, first_column);
        self.finish();
    }

    #[wasm_bindgen(js_name = "setCurrentCell")]
    pub fn set_current_cell(&mut self, row: u32, column: u32) {
        self.view.set_current_model_cell(CellAddress::cell(row, column));
        self.finish();
    }

    /// `[row, column]` of the current cell in model coordinates.
    #[wasm_bindgen(js_name = "currentCell")]
    pub fn current_cell(&self) -> Option<Vec<u32>> {
        let cell = self.view.current_model_cell();
        Some(vec![cell.row?, cell.column?])
    }

    /// Selection as `[minRow, minCol, maxRow, maxCol]`, real coordinates.
    #[wasm_bindgen(js_name = "selection")]
    pub fn selection(&self) -> Option<Vec<u32>> {
        let rect = self.view.selection_rect()?;
        Some(vec![rect.from().row, rect.from().column, rect.to().row, rect.to().column])
    }

    #[wasm_bindgen(js_name = "copySelection")]
    pub fn copy_selection(&mut self) -> Option<String> {
        let text = self.view.copy_selection();
        self.forward_events();
        text
    }

    #[wasm_bindgen(js_name = "fitColumns")]
    pub fn fit_columns(&mut self) {
        self.view.handle_command(CellAddress::EMPTY, crate::viewer::commands::ADJUST_COLUMN_SIZES);
        self.finish();
    }

    #[wasm_bindgen(js_name = "setFlexibleRows")]
    pub fn set_flexible_rows(&mut self, flexible: bool) {
        self.view.set_flexible_rows(flexible);
        self.finish();
    }

    /// CSS cursor name for the current pointer position.
    pub fn cursor(&self) -> String {
        use crate::viewer::CursorHint;
        match self.view.cursor() {
            CursorHint::Default => "default",
            CursorHint::ResizeColumn => "col-resize",
            CursorHint::ReorderColumn => "grabbing",
            CursorHint::NoDrop => "no-drop",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = "lastRenderStats")]
    pub fn last_render_stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.view.last_render_stats()).map_err(js_err)
    }

    pub fn width(&self) -> i32 {
        self.view.surface().width()
    }

    pub fn height(&self) -> i32 {
        self.view.surface().height()
    }
}

impl WasmGrid {
    fn finish(&mut self) {
        self.view.flush();
        self.forward_events();
    }

    fn forward_events(&mut self) {
        let events = self.events.take();
        let Some(callback) = &self.callback else {
            return;
        };
        for event in events {
            let value = match serde_wasm_bindgen::to_value(&event) {
                Ok(v) => v,
                Err(e) => {
                    warn!(target: "gridview::web", error = %e, "event serialization failed");
                    continue;
                }
            };
            if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                warn!(target: "gridview::web", error = ?e, "event callback threw");
            }
        }
    }
}
