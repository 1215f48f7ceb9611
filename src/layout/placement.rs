// Admission checks and initial placement for new panels.
//
// Two layers:
// - geometry: a new panel must fit its own size limits and overlap nothing
// - policy: application rules about panel kinds (e.g. one settings panel),
//   kept separate so the geometry checks never depend on what a panel shows

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::collision::CollisionResolver;
use super::spatial_grid::{SpatialIndex, DEFAULT_CELL_SIZE};
use super::{Point, Rect, Size};
use crate::error::PlacementError;
use crate::panel::{Panel, PanelKind};
use crate::zindex::ZIndexLayer;

/// Safety valve for the row scan in [`find_first_free_position`].
const MAX_SCAN_POSITIONS: usize = 100_000;

/// Geometry-only admission check. See [`check_panel_admission`] for the reason
/// a panel is rejected.
pub fn can_add_panel(panel: &Panel, existing: &[Panel]) -> bool {
    check_panel_admission(panel, existing).is_ok()
}

pub fn check_panel_admission(panel: &Panel, existing: &[Panel]) -> Result<(), PlacementError> {
    if existing.iter().any(|p| p.id == panel.id) {
        return Err(PlacementError::DuplicateId(panel.id.clone()));
    }
    if let Some(limits) = panel.constraints {
        if !limits.admits(panel.size) {
            return Err(PlacementError::SizeOutOfLimits {
                id: panel.id.clone(),
                width: panel.size.width,
                height: panel.size.height,
            });
        }
    }
    let index = SpatialIndex::from_panels(existing, DEFAULT_CELL_SIZE);
    let hits = CollisionResolver::new(&index).find_collisions(&panel.rect(), None);
    if hits.colliding {
        return Err(PlacementError::Collides { id: panel.id.clone(), others: hits.panels });
    }
    Ok(())
}

/// Application-level placement rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementPolicy {
    /// Kinds of which at most one panel may exist.
    pub singleton_kinds: HashSet<PanelKind>,
}

impl PlacementPolicy {
    pub fn with_singleton(mut self, kind: PanelKind) -> Self {
        self.singleton_kinds.insert(kind);
        self
    }

    pub fn check(&self, kind: &PanelKind, existing: &[Panel]) -> Result<(), PlacementError> {
        if self.singleton_kinds.contains(kind) && existing.iter().any(|p| &p.kind == kind) {
            return Err(PlacementError::SingletonExists(kind.clone()));
        }
        Ok(())
    }

    /// Policy first, then geometry.
    pub fn admit(&self, panel: &Panel, existing: &[Panel]) -> Result<(), PlacementError> {
        self.check(&panel.kind, existing)?;
        check_panel_admission(panel, existing)
    }
}

/// Z-index for a newly created panel: just above everything in the panel layer.
pub fn initial_z_index(existing: &[Panel], spacing: i64) -> i64 {
    let layer = ZIndexLayer::Panel;
    existing
        .iter()
        .filter(|p| ZIndexLayer::for_z_index(p.z_index) == layer)
        .map(|p| p.z_index)
        .max()
        .unwrap_or(layer.base())
        + spacing
}

/// First collision-free position for `size` inside `bounds`, scanning
/// left-to-right, top-to-bottom in `step` increments.
pub fn find_first_free_position(size: Size, existing: &[Panel], bounds: &Rect, step: f64) -> Option<Point> {
    if !(step.is_finite() && step > 0.0) || size.width > bounds.width || size.height > bounds.height {
        return None;
    }
    let index = SpatialIndex::from_panels(existing, DEFAULT_CELL_SIZE);
    let resolver = CollisionResolver::new(&index);

    let mut tested = 0usize;
    let mut y = bounds.y;
    while y + size.height <= bounds.bottom() {
        let mut x = bounds.x;
        while x + size.width <= bounds.right() {
            if resolver.is_valid_position(Point::new(x, y), size, None, None) {
                return Some(Point::new(x, y));
            }
            tested += 1;
            if tested >= MAX_SCAN_POSITIONS {
                log::debug!("free position scan gave up after {} candidates", tested);
                return None;
            }
            x += step;
        }
        y += step;
    }
    None
}
