//! Panel layout and spatial constraint engine.
//!
//! Geometry, a bucket-grid spatial index, collision resolution, grid
//! snapping, resize validation and z-index layering for a workspace of
//! freely placed panels. Panels belong to the caller: every operation reads a
//! snapshot and returns new positions, sizes or z-indices to apply.

pub mod engine;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod output;
pub mod panel;
pub mod wasm;
pub mod zindex;

use wasm_bindgen::prelude::*;

pub use engine::LayoutEngine;
pub use error::{BindingError, PlacementError};
pub use interaction::{DragPreview, DragSession, ResizePreview, ResizeSession};
pub use layout::collision::{CollisionPreview, CollisionResolver, CollisionResult, SearchOptions};
pub use layout::grid_snap::{GridLines, GridOrigin, GridSettings, MagneticSnap};
pub use layout::placement::{can_add_panel, PlacementPolicy};
pub use layout::resize::{ResizeConstraints, ResizeHandle, ResizeValidation};
pub use layout::spatial_grid::SpatialIndex;
pub use layout::{EngineConfig, Point, Rect, Size};
pub use panel::{Panel, PanelId, PanelKind, PanelSizeLimits};
pub use zindex::{ConflictType, ZIndexConflict, ZIndexLayer, ZIndexManager};

// Runs once when the WASM module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A host may already have installed a logger.
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("panel layout engine initialized");
}
