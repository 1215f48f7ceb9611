//! The caller-owned engine instance.
//!
//! `LayoutEngine` bundles a persistent spatial index, the grid settings and a
//! z-index manager. The index is a cache of the caller's panel store: it is
//! only updated through `insert_panel`/`remove_panel`/`rebuild`, never behind
//! the caller's back. When in doubt, `rebuild`.

use crate::layout::collision::{CollisionPreview, CollisionResolver, CollisionResult, SearchOptions};
use crate::layout::grid_snap::{magnetic_snap_to_grid, GridSettings, MagneticSnap};
use crate::layout::resize::{validate_resize_operation, ResizeConstraints, ResizeValidation};
use crate::layout::spatial_grid::SpatialIndex;
use crate::layout::{EngineConfig, Point, Rect, Size};
use crate::panel::{Panel, PanelId};
use crate::zindex::{ZIndexConflict, ZIndexLayer, ZIndexManager};

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: EngineConfig,
    index: SpatialIndex,
    z_order: ZIndexManager,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl LayoutEngine {
    pub fn new(config: EngineConfig) -> Self {
        let index = SpatialIndex::new(config.cell_size);
        let z_order = ZIndexManager::new(config.z_index_spacing, config.history_capacity);
        Self { config, index, z_order }
    }

    /// Engine with its index already built from `panels`.
    pub fn with_panels(config: EngineConfig, panels: &[Panel]) -> Self {
        let mut engine = Self::new(config);
        engine.rebuild(panels);
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridSettings {
        &self.config.grid
    }

    pub fn set_grid(&mut self, grid: GridSettings) {
        self.config.grid = grid;
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions { radius: self.config.search_radius, step: self.config.search_step }
    }

    // Index maintenance

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn insert_panel(&mut self, panel: &Panel) {
        self.index.insert(panel);
    }

    pub fn remove_panel(&mut self, id: &PanelId) -> bool {
        self.index.remove(id)
    }

    pub fn rebuild(&mut self, panels: &[Panel]) {
        self.index.rebuild(panels);
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    // Collision

    pub fn resolver(&self) -> CollisionResolver<'_> {
        CollisionResolver::new(&self.index)
    }

    pub fn find_collisions(&self, target: &Rect, exclude: Option<&PanelId>) -> CollisionResult {
        self.resolver().find_collisions(target, exclude)
    }

    pub fn is_valid_position(
        &self,
        position: Point,
        size: Size,
        exclude: Option<&PanelId>,
        bounds: Option<&Rect>,
    ) -> bool {
        self.resolver().is_valid_position(position, size, exclude, bounds)
    }

    pub fn prevent_overlap(
        &self,
        position: Point,
        size: Size,
        bounds: Option<&Rect>,
        exclude: Option<&PanelId>,
    ) -> Point {
        self.resolver().prevent_overlap(position, size, bounds, exclude, self.search_options())
    }

    pub fn push_away_overlapping(&self, moved: &Panel, panels: &[Panel], bounds: Option<&Rect>) -> Vec<Panel> {
        self.resolver().push_away_overlapping(moved, panels, bounds)
    }

    pub fn collision_preview(&self, position: Point, size: Size, exclude: Option<&PanelId>) -> CollisionPreview {
        self.resolver().collision_preview(position, size, exclude, self.search_options())
    }

    // Snapping

    /// Threshold-gated per-axis snap with the configured grid.
    pub fn snap_position(&self, position: Point) -> Point {
        self.config.grid.snap(position)
    }

    /// Euclidean snap with the configured grid, using the snap threshold as radius.
    pub fn magnetic_snap(&self, position: Point) -> MagneticSnap {
        let grid = &self.config.grid;
        magnetic_snap_to_grid(position, grid.size, grid.snap_threshold, grid.enabled)
    }

    pub fn validate_resize(
        &self,
        panel: &Panel,
        new_size: Size,
        constraints: &ResizeConstraints,
        other_panels: &[Panel],
    ) -> ResizeValidation {
        validate_resize_operation(panel, new_size, constraints, other_panels)
    }

    // Z-order

    pub fn z_order(&self) -> &ZIndexManager {
        &self.z_order
    }

    pub fn z_order_mut(&mut self) -> &mut ZIndexManager {
        &mut self.z_order
    }

    pub fn bring_to_front(&mut self, id: &PanelId, panels: &[Panel], layer: ZIndexLayer) -> Vec<Panel> {
        self.z_order.bring_to_front(id, panels, layer)
    }

    pub fn send_to_back(&mut self, id: &PanelId, panels: &[Panel], layer: ZIndexLayer) -> Vec<Panel> {
        self.z_order.send_to_back(id, panels, layer)
    }

    pub fn bring_forward(&mut self, id: &PanelId, panels: &[Panel]) -> Vec<Panel> {
        self.z_order.bring_forward(id, panels)
    }

    pub fn send_backward(&mut self, id: &PanelId, panels: &[Panel]) -> Vec<Panel> {
        self.z_order.send_backward(id, panels)
    }

    pub fn set_to_layer(&mut self, id: &PanelId, panels: &[Panel], layer: ZIndexLayer) -> Vec<Panel> {
        self.z_order.set_to_layer(id, panels, layer)
    }

    pub fn detect_conflicts(&self, panels: &[Panel]) -> Vec<ZIndexConflict> {
        self.z_order.detect_conflicts(panels)
    }

    pub fn auto_arrange(&mut self, panels: &[Panel]) -> Vec<Panel> {
        self.z_order.auto_arrange(panels)
    }

    pub fn optimize_z_indices(&mut self, panels: &[Panel]) -> Vec<Panel> {
        self.z_order.optimize_z_indices(panels)
    }

    pub fn undo_last_operation(&mut self, panels: &[Panel]) -> Vec<Panel> {
        self.z_order.undo_last_operation(panels)
    }
}
