//! Drag and resize sessions.
//!
//! A session captures the panel at pointer-down, is fed every pointer move,
//! and yields the geometry to commit at pointer-up. Nothing is applied to the
//! caller's panels until `finish`.

use serde::Serialize;

use crate::engine::LayoutEngine;
use crate::layout::resize::{
    anchored_position, apply_resize_handle, validate_resize_from_handle, ResizeConstraints, ResizeHandle,
    ResizeValidation,
};
use crate::layout::{Point, Size};
use crate::panel::{Panel, PanelId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPreview {
    pub position: Point,
    pub snapped: bool,
    pub is_valid: bool,
    pub collisions: Vec<PanelId>,
    pub suggested_position: Option<Point>,
}

#[derive(Debug, Clone)]
pub struct DragSession {
    panel_id: PanelId,
    size: Size,
    origin: Point,
    /// Pointer position relative to the panel origin at pointer-down.
    grab: Point,
    last_valid: Option<Point>,
}

impl DragSession {
    pub fn start(panel: &Panel, pointer: Point) -> Self {
        Self {
            panel_id: panel.id.clone(),
            size: panel.size,
            origin: panel.position,
            grab: Point::new(pointer.x - panel.position.x, pointer.y - panel.position.y),
            last_valid: None,
        }
    }

    pub fn panel_id(&self) -> &PanelId {
        &self.panel_id
    }

    /// Snap the dragged origin to the grid, then check it against the
    /// engine's index. An invalid spot remembers the suggested alternative.
    pub fn update(&mut self, pointer: Point, engine: &LayoutEngine) -> DragPreview {
        let raw = Point::new(pointer.x - self.grab.x, pointer.y - self.grab.y);
        let snap = engine.magnetic_snap(raw);
        let preview = engine.collision_preview(snap.position, self.size, Some(&self.panel_id));

        if preview.is_valid {
            self.last_valid = Some(snap.position);
        } else if let Some(suggested) = preview.suggested_position {
            self.last_valid = Some(suggested);
        }

        DragPreview {
            position: snap.position,
            snapped: snap.snapped,
            is_valid: preview.is_valid,
            collisions: preview.collisions,
            suggested_position: preview.suggested_position,
        }
    }

    /// Position to commit. Falls back to where the drag started.
    pub fn finish(self) -> Point {
        self.last_valid.unwrap_or(self.origin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizePreview {
    pub position: Point,
    pub size: Size,
    pub validation: ResizeValidation,
}

#[derive(Debug, Clone)]
pub struct ResizeSession {
    panel: Panel,
    handle: ResizeHandle,
    start_pointer: Point,
    last_valid: Option<(Point, Size)>,
}

impl ResizeSession {
    pub fn start(panel: &Panel, handle: ResizeHandle, pointer: Point) -> Self {
        Self { panel: panel.clone(), handle, start_pointer: pointer, last_valid: None }
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// The geometry validated is the geometry previewed: corrections to the
    /// size keep the edges opposite the handle in place.
    pub fn update(&mut self, pointer: Point, constraints: &ResizeConstraints, others: &[Panel]) -> ResizePreview {
        let delta = Point::new(pointer.x - self.start_pointer.x, pointer.y - self.start_pointer.y);
        let (_, requested) = apply_resize_handle(self.panel.position, self.panel.size, self.handle, delta);

        let validation = validate_resize_from_handle(&self.panel, self.handle, requested, constraints, others);
        let size = validation.constrained_size;
        let position = anchored_position(self.panel.position, self.panel.size, self.handle, size);

        if validation.is_valid {
            self.last_valid = Some((position, size));
        }
        ResizePreview { position, size, validation }
    }

    /// Geometry to commit: the last valid step, else the starting geometry.
    pub fn finish(self) -> (Point, Size) {
        self.last_valid.unwrap_or((self.panel.position, self.panel.size))
    }
}
