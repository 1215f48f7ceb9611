//! WASM bindings for the panel-layout-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Records cross the boundary as camelCase JSON strings. Malformed input
//! never panics: it is logged and answered with `{"error": {"message": ...}}`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::engine::LayoutEngine;
use crate::error::BindingError;
use crate::layout::collision::{self, SearchOptions};
use crate::layout::grid_snap::{self, GridSettings, DEFAULT_GRID_DENSITY};
use crate::layout::placement::{check_panel_admission, PlacementPolicy};
use crate::layout::resize::{validate_resize_operation, ResizeConstraints};
use crate::layout::{EngineConfig, Point, Rect, Size};
use crate::output::{error_json, to_json, AdmissionOutput, PanelsOutput};
use crate::panel::{Panel, PanelId};
use crate::zindex::ZIndexLayer;

fn parse<T: DeserializeOwned>(what: &'static str, json: &str) -> Result<T, BindingError> {
    serde_json::from_str(json).map_err(|e| BindingError::json(what, e))
}

/// Missing, empty and `null` all mean "not given".
fn parse_optional<T: DeserializeOwned>(what: &'static str, json: Option<String>) -> Result<Option<T>, BindingError> {
    match json.as_deref().map(str::trim) {
        None | Some("") | Some("null") => Ok(None),
        Some(s) => parse(what, s).map(Some),
    }
}

fn parse_layer(name: Option<String>) -> Result<ZIndexLayer, BindingError> {
    match name {
        None => Ok(ZIndexLayer::Panel),
        Some(name) => ZIndexLayer::from_name(&name).ok_or(BindingError::UnknownLayer(name)),
    }
}

fn respond<T: Serialize>(op: impl FnOnce() -> Result<T, BindingError>) -> String {
    match op() {
        Ok(value) => to_json(&value),
        Err(e) => {
            log::error!("{}", e);
            error_json(&e.to_string())
        }
    }
}

fn exclude_of(id: &Option<String>) -> Option<PanelId> {
    id.as_deref().map(PanelId::from)
}

#[wasm_bindgen]
pub fn find_collisions(panels_json: &str, target_json: &str, exclude_id: Option<String>) -> String {
    respond(|| {
        let panels: Vec<Panel> = parse("panels", panels_json)?;
        let target: Rect = parse("target", target_json)?;
        Ok(collision::find_collisions(&panels, &target, exclude_of(&exclude_id).as_ref()))
    })
}

#[wasm_bindgen]
pub fn is_valid_position(
    panels_json: &str,
    position_json: &str,
    size_json: &str,
    exclude_id: Option<String>,
    bounds_json: Option<String>,
) -> String {
    respond(|| {
        let panels: Vec<Panel> = parse("panels", panels_json)?;
        let position: Point = parse("position", position_json)?;
        let size: Size = parse("size", size_json)?;
        let bounds: Option<Rect> = parse_optional("bounds", bounds_json)?;
        Ok(collision::is_valid_position(position, size, &panels, exclude_of(&exclude_id).as_ref(), bounds.as_ref()))
    })
}

#[wasm_bindgen]
pub fn prevent_overlap(
    panels_json: &str,
    position_json: &str,
    size_json: &str,
    bounds_json: Option<String>,
    exclude_id: Option<String>,
    search_json: Option<String>,
) -> String {
    respond(|| {
        let panels: Vec<Panel> = parse("panels", panels_json)?;
        let position: Point = parse("position", position_json)?;
        let size: Size = parse("size", size_json)?;
        let bounds: Option<Rect> = parse_optional("bounds", bounds_json)?;
        let search: SearchOptions = parse_optional("search", search_json)?.unwrap_or_default();
        Ok(collision::prevent_overlap(position, size, &panels, bounds.as_ref(), exclude_of(&exclude_id).as_ref(), search))
    })
}

#[wasm_bindgen]
pub fn push_away_overlapping(moved_json: &str, panels_json: &str, bounds_json: Option<String>) -> String {
    respond(|| {
        let moved: Panel = parse("moved panel", moved_json)?;
        let panels: Vec<Panel> = parse("panels", panels_json)?;
        let bounds: Option<Rect> = parse_optional("bounds", bounds_json)?;
        let pushed = collision::push_away_overlapping(&moved, &panels, bounds.as_ref());
        Ok(PanelsOutput::diff(&panels, pushed))
    })
}

#[wasm_bindgen]
pub fn collision_preview(panels_json: &str, position_json: &str, size_json: &str, exclude_id: Option<String>) -> String {
    respond(|| {
        let panels: Vec<Panel> = parse("panels", panels_json)?;
        let position: Point = parse("position", position_json)?;
        let size: Size = parse("size", size_json)?;
        Ok(collision::collision_preview(position, size, &panels, exclude_of(&exclude_id).as_ref()))
    })
}

/// Geometry check plus the optional application policy.
#[wasm_bindgen]
pub fn can_add_panel(panel_json: &str, existing_json: &str, policy_json: Option<String>) -> String {
    respond(|| {
        let panel: Panel = parse("panel", panel_json)?;
        let existing: Vec<Panel> = parse("panels", existing_json)?;
        let policy: Option<PlacementPolicy> = parse_optional("policy", policy_json)?;
        let verdict = match &policy {
            Some(policy) => policy.admit(&panel, &existing),
            None => check_panel_admission(&panel, &existing),
        };
        Ok(match verdict {
            Ok(()) => AdmissionOutput { allowed: true, reason: None },
            Err(e) => AdmissionOutput { allowed: false, reason: Some(e.to_string()) },
        })
    })
}

#[wasm_bindgen]
pub fn snap_to_grid(x: f64, y: f64, grid_size: f64, threshold: f64) -> String {
    to_json(&grid_snap::snap_to_grid(Point::new(x, y), grid_size, threshold))
}

#[wasm_bindgen]
pub fn magnetic_snap_to_grid(x: f64, y: f64, grid_size: f64, radius: f64, enabled: bool) -> String {
    to_json(&grid_snap::magnetic_snap_to_grid(Point::new(x, y), grid_size, radius, enabled))
}

#[wasm_bindgen]
pub fn snap_rectangle_to_grid(position_json: &str, size_json: &str, grid_size: f64, threshold: f64, snap_size: bool) -> String {
    respond(|| {
        let position: Point = parse("position", position_json)?;
        let size: Size = parse("size", size_json)?;
        Ok(grid_snap::snap_rectangle_to_grid(position, size, grid_size, threshold, snap_size))
    })
}

#[wasm_bindgen]
pub fn calculate_grid_lines(width: f64, height: f64, settings_json: Option<String>) -> String {
    respond(|| {
        let settings: GridSettings = parse_optional("grid settings", settings_json)?.unwrap_or_default();
        Ok(grid_snap::calculate_grid_lines(Size::new(width, height), &settings))
    })
}

#[wasm_bindgen]
pub fn calculate_optimal_grid_size(width: f64, height: f64, target_density: Option<f64>) -> f64 {
    grid_snap::calculate_optimal_grid_size(Size::new(width, height), target_density.unwrap_or(DEFAULT_GRID_DENSITY))
}

/// Without constraints the panel's own size limits apply.
#[wasm_bindgen]
pub fn validate_resize(panel_json: &str, size_json: &str, constraints_json: Option<String>, others_json: &str) -> String {
    respond(|| {
        let panel: Panel = parse("panel", panel_json)?;
        let size: Size = parse("size", size_json)?;
        let constraints: ResizeConstraints =
            parse_optional("constraints", constraints_json)?.unwrap_or_else(|| ResizeConstraints::for_panel(&panel));
        let others: Vec<Panel> = parse("panels", others_json)?;
        Ok(validate_resize_operation(&panel, size, &constraints, &others))
    })
}

/// Long-lived engine handle: persistent spatial index plus z-order history.
#[wasm_bindgen]
pub struct WasmLayoutEngine {
    inner: LayoutEngine,
}

#[wasm_bindgen]
impl WasmLayoutEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmLayoutEngine, JsError> {
        let config: EngineConfig = parse_optional("engine config", config_json)?.unwrap_or_default();
        log::debug!("layout engine created: {:?}", config);
        Ok(WasmLayoutEngine { inner: LayoutEngine::new(config) })
    }

    pub fn rebuild(&mut self, panels_json: &str) -> Result<(), JsError> {
        let panels: Vec<Panel> = parse("panels", panels_json)?;
        self.inner.rebuild(&panels);
        Ok(())
    }

    pub fn insert_panel(&mut self, panel_json: &str) -> Result<(), JsError> {
        let panel: Panel = parse("panel", panel_json)?;
        self.inner.insert_panel(&panel);
        Ok(())
    }

    pub fn remove_panel(&mut self, id: &str) -> bool {
        self.inner.remove_panel(&PanelId::from(id))
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn set_grid(&mut self, settings_json: &str) -> Result<(), JsError> {
        let settings: GridSettings = parse("grid settings", settings_json)?;
        self.inner.set_grid(settings);
        Ok(())
    }

    pub fn find_collisions(&self, target_json: &str, exclude_id: Option<String>) -> String {
        respond(|| {
            let target: Rect = parse("target", target_json)?;
            Ok(self.inner.find_collisions(&target, exclude_of(&exclude_id).as_ref()))
        })
    }

    pub fn prevent_overlap(
        &self,
        position_json: &str,
        size_json: &str,
        bounds_json: Option<String>,
        exclude_id: Option<String>,
    ) -> String {
        respond(|| {
            let position: Point = parse("position", position_json)?;
            let size: Size = parse("size", size_json)?;
            let bounds: Option<Rect> = parse_optional("bounds", bounds_json)?;
            Ok(self.inner.prevent_overlap(position, size, bounds.as_ref(), exclude_of(&exclude_id).as_ref()))
        })
    }

    pub fn collision_preview(&self, position_json: &str, size_json: &str, exclude_id: Option<String>) -> String {
        respond(|| {
            let position: Point = parse("position", position_json)?;
            let size: Size = parse("size", size_json)?;
            Ok(self.inner.collision_preview(position, size, exclude_of(&exclude_id).as_ref()))
        })
    }

    pub fn snap_position(&self, x: f64, y: f64) -> String {
        to_json(&self.inner.snap_position(Point::new(x, y)))
    }

    pub fn magnetic_snap(&self, x: f64, y: f64) -> String {
        to_json(&self.inner.magnetic_snap(Point::new(x, y)))
    }

    pub fn bring_to_front(&mut self, id: &str, panels_json: &str, layer: Option<String>) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let layer = parse_layer(layer)?;
            let updated = self.inner.bring_to_front(&PanelId::from(id), &panels, layer);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn send_to_back(&mut self, id: &str, panels_json: &str, layer: Option<String>) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let layer = parse_layer(layer)?;
            let updated = self.inner.send_to_back(&PanelId::from(id), &panels, layer);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn bring_forward(&mut self, id: &str, panels_json: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let updated = self.inner.bring_forward(&PanelId::from(id), &panels);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn send_backward(&mut self, id: &str, panels_json: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let updated = self.inner.send_backward(&PanelId::from(id), &panels);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn set_to_layer(&mut self, id: &str, panels_json: &str, layer: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let layer = parse_layer(Some(layer.to_string()))?;
            let updated = self.inner.set_to_layer(&PanelId::from(id), &panels, layer);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn detect_conflicts(&self, panels_json: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            Ok(self.inner.detect_conflicts(&panels))
        })
    }

    pub fn auto_arrange(&mut self, panels_json: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let updated = self.inner.auto_arrange(&panels);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn optimize_z_indices(&mut self, panels_json: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let updated = self.inner.optimize_z_indices(&panels);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn undo_last_operation(&mut self, panels_json: &str) -> String {
        respond(|| {
            let panels: Vec<Panel> = parse("panels", panels_json)?;
            let updated = self.inner.undo_last_operation(&panels);
            Ok(PanelsOutput::diff(&panels, updated))
        })
    }

    pub fn can_undo(&self) -> bool {
        self.inner.z_order().can_undo()
    }

    pub fn history(&self) -> String {
        let entries: Vec<_> = self.inner.z_order().history().entries().collect();
        to_json(&entries)
    }

    pub fn clear_history(&mut self) {
        self.inner.z_order_mut().clear_history();
    }
}
