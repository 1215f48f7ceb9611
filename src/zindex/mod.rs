//! Z-index layer manager.
//!
//! Every operation takes the current panel snapshot and returns a new
//! collection with updated z-indices; nothing is mutated in place. The
//! manager instance owns only the spacing constant and the undo history.
//!
//! `auto_arrange` and `optimize_z_indices` are bulk operations. They are
//! recorded in the history for inspection but `undo_last_operation` skips
//! them: only single-panel moves can be undone.

pub mod history;
pub mod layers;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::panel::{find_panel, Panel, PanelId};

pub use history::{ZIndexHistory, ZIndexHistoryEntry, ZIndexOperation};
pub use layers::{ZIndexLayer, LAYER_SPAN};

pub const DEFAULT_SPACING: i64 = 10;
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
/// Largest z-index a browser will honour.
pub const MAX_Z_INDEX: i64 = i32::MAX as i64;

/// Fraction of [`MAX_Z_INDEX`] above which `optimize_z_indices` repacks.
const OPTIMIZE_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictType {
    Duplicate,
    Overlap,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZIndexConflict {
    pub panel_ids: Vec<PanelId>,
    pub z_index: i64,
    pub conflict_type: ConflictType,
    pub suggested_resolution: String,
}

#[derive(Debug, Clone)]
pub struct ZIndexManager {
    spacing: i64,
    history: ZIndexHistory,
}

impl Default for ZIndexManager {
    fn default() -> Self {
        Self::new(DEFAULT_SPACING, DEFAULT_HISTORY_CAPACITY)
    }
}

impl ZIndexManager {
    /// Non-positive spacing falls back to 1.
    pub fn new(spacing: i64, history_capacity: usize) -> Self {
        Self { spacing: spacing.max(1), history: ZIndexHistory::new(history_capacity) }
    }

    pub fn spacing(&self) -> i64 {
        self.spacing
    }

    pub fn layer_for_z_index(z_index: i64) -> ZIndexLayer {
        ZIndexLayer::for_z_index(z_index)
    }

    /// Panels whose z-index derives to `layer`, in input order.
    pub fn panels_in_layer(panels: &[Panel], layer: ZIndexLayer) -> Vec<&Panel> {
        panels.iter().filter(|p| ZIndexLayer::for_z_index(p.z_index) == layer).collect()
    }

    pub fn history(&self) -> &ZIndexHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn bring_to_front(&mut self, panel_id: &PanelId, panels: &[Panel], layer: ZIndexLayer) -> Vec<Panel> {
        self.move_to_top(ZIndexOperation::BringToFront, panel_id, panels, layer)
    }

    /// Below the lowest panel in `layer`, never below the layer's base.
    pub fn send_to_back(&mut self, panel_id: &PanelId, panels: &[Panel], layer: ZIndexLayer) -> Vec<Panel> {
        let Some(current) = find_panel(panels, panel_id) else {
            return unknown_panel(panel_id, panels);
        };
        let bottom = Self::panels_in_layer(panels, layer)
            .iter()
            .map(|p| p.z_index)
            .min()
            .unwrap_or(layer.base());
        let target = bottom.saturating_sub(self.spacing).max(layer.base());
        self.apply(ZIndexOperation::SendToBack, panel_id, current.z_index, target, panels)
    }

    /// One step up within the panel's own layer. No-op for the frontmost panel.
    pub fn bring_forward(&mut self, panel_id: &PanelId, panels: &[Panel]) -> Vec<Panel> {
        let Some(current) = find_panel(panels, panel_id) else {
            return unknown_panel(panel_id, panels);
        };
        let layer = ZIndexLayer::for_z_index(current.z_index);
        let ordered = ordered_layer(panels, layer);
        let Some(pos) = ordered.iter().position(|p| &p.id == panel_id) else {
            return panels.to_vec();
        };
        match ordered.get(pos + 1) {
            Some(next) => {
                let target = next.z_index.saturating_add(1).min(layer.ceiling() - 1);
                self.apply(ZIndexOperation::BringForward, panel_id, current.z_index, target, panels)
            }
            None => panels.to_vec(),
        }
    }

    /// One step down within the panel's own layer. No-op for the backmost panel.
    pub fn send_backward(&mut self, panel_id: &PanelId, panels: &[Panel]) -> Vec<Panel> {
        let Some(current) = find_panel(panels, panel_id) else {
            return unknown_panel(panel_id, panels);
        };
        let layer = ZIndexLayer::for_z_index(current.z_index);
        let ordered = ordered_layer(panels, layer);
        let Some(pos) = ordered.iter().position(|p| &p.id == panel_id) else {
            return panels.to_vec();
        };
        if pos == 0 {
            return panels.to_vec();
        }
        let target = ordered[pos - 1].z_index.saturating_sub(1).max(layer.base());
        self.apply(ZIndexOperation::SendBackward, panel_id, current.z_index, target, panels)
    }

    /// Move a panel to the top of another layer.
    pub fn set_to_layer(&mut self, panel_id: &PanelId, panels: &[Panel], target: ZIndexLayer) -> Vec<Panel> {
        self.move_to_top(ZIndexOperation::SetLayer, panel_id, panels, target)
    }

    pub fn detect_conflicts(&self, panels: &[Panel]) -> Vec<ZIndexConflict> {
        let mut by_z: BTreeMap<i64, Vec<PanelId>> = BTreeMap::new();
        for panel in panels {
            by_z.entry(panel.z_index).or_default().push(panel.id.clone());
        }

        let mut conflicts = Vec::new();
        for (z_index, ids) in by_z {
            if ids.len() > 1 {
                let layer = ZIndexLayer::for_z_index(z_index);
                conflicts.push(ZIndexConflict {
                    panel_ids: ids,
                    z_index,
                    conflict_type: ConflictType::Duplicate,
                    suggested_resolution: format!("auto-arrange the {} layer to give each panel a distinct z-index", layer),
                });
            }
        }

        for panel in panels {
            let layer = ZIndexLayer::for_z_index(panel.z_index);
            if !layer.contains(panel.z_index) {
                conflicts.push(ZIndexConflict {
                    panel_ids: vec![panel.id.clone()],
                    z_index: panel.z_index,
                    conflict_type: ConflictType::Invalid,
                    suggested_resolution: format!(
                        "move {} into the {} band [{}, {})",
                        panel.id,
                        layer,
                        layer.base(),
                        layer.ceiling()
                    ),
                });
            }
        }
        conflicts
    }

    /// Repack every layer as `base + rank * spacing`, but only when
    /// [`detect_conflicts`](Self::detect_conflicts) finds something.
    /// Ties keep their input order.
    pub fn auto_arrange(&mut self, panels: &[Panel]) -> Vec<Panel> {
        if self.detect_conflicts(panels).is_empty() {
            return panels.to_vec();
        }
        self.repack(ZIndexOperation::AutoArrange, panels)
    }

    /// Same packing as `auto_arrange`, triggered by the highest z-index
    /// climbing past 80% of [`MAX_Z_INDEX`].
    pub fn optimize_z_indices(&mut self, panels: &[Panel]) -> Vec<Panel> {
        let highest = panels.iter().map(|p| p.z_index).max();
        match highest {
            Some(z) if z as f64 > MAX_Z_INDEX as f64 * OPTIMIZE_THRESHOLD => {
                log::debug!("z-index {} near the limit, repacking {} panels", z, panels.len());
                self.repack(ZIndexOperation::Optimize, panels)
            }
            _ => panels.to_vec(),
        }
    }

    /// Restore the previous z-index of the most recent single-panel change.
    pub fn undo_last_operation(&mut self, panels: &[Panel]) -> Vec<Panel> {
        let Some(entry) = self.history.pop_last_single() else {
            return panels.to_vec();
        };
        if find_panel(panels, &entry.panel_id).is_none() {
            log::debug!("undo target {} no longer exists", entry.panel_id);
            return panels.to_vec();
        }
        with_z_index(panels, &entry.panel_id, entry.old_z_index)
    }

    fn move_to_top(
        &mut self,
        operation: ZIndexOperation,
        panel_id: &PanelId,
        panels: &[Panel],
        layer: ZIndexLayer,
    ) -> Vec<Panel> {
        let Some(current) = find_panel(panels, panel_id) else {
            return unknown_panel(panel_id, panels);
        };
        let top = Self::panels_in_layer(panels, layer)
            .iter()
            .map(|p| p.z_index)
            .max()
            .unwrap_or(layer.base());
        let target = top.saturating_add(self.spacing);
        self.apply(operation, panel_id, current.z_index, target, panels)
    }

    fn apply(
        &mut self,
        operation: ZIndexOperation,
        panel_id: &PanelId,
        old_z_index: i64,
        new_z_index: i64,
        panels: &[Panel],
    ) -> Vec<Panel> {
        if old_z_index == new_z_index {
            return panels.to_vec();
        }
        log::trace!("{:?} {}: {} -> {}", operation, panel_id, old_z_index, new_z_index);
        self.history.record(operation, panel_id.clone(), old_z_index, new_z_index);
        with_z_index(panels, panel_id, new_z_index)
    }

    /// Layers are packed bottom to top. A layer never starts below the value
    /// after the last one handed out, so an overfull band spills upward
    /// instead of colliding with the band above it.
    fn repack(&mut self, operation: ZIndexOperation, panels: &[Panel]) -> Vec<Panel> {
        let mut result = panels.to_vec();
        let mut next_free = i64::MIN;
        for layer in ZIndexLayer::ALL {
            let mut members: Vec<usize> = (0..panels.len())
                .filter(|&i| ZIndexLayer::for_z_index(panels[i].z_index) == layer)
                .collect();
            if members.is_empty() {
                continue;
            }
            members.sort_by_key(|&i| panels[i].z_index);

            let count = members.len() as i64;
            let step = if count * self.spacing > LAYER_SPAN {
                log::debug!("{} panels in the {} layer, packing tighter than spacing", count, layer);
                (LAYER_SPAN / count).max(1)
            } else {
                self.spacing
            };

            let start = layer.base().max(next_free);
            if start > layer.base() {
                log::warn!("{} layer starts at {} after the layer below overflowed", layer, start);
            }
            for (rank, &i) in members.iter().enumerate() {
                let z_index = start + rank as i64 * step;
                if result[i].z_index != z_index {
                    self.history.record(operation, result[i].id.clone(), result[i].z_index, z_index);
                    result[i].z_index = z_index;
                }
                next_free = z_index + 1;
            }
        }
        result
    }
}

/// Panels of one layer sorted by z-index; ties keep input order.
fn ordered_layer(panels: &[Panel], layer: ZIndexLayer) -> Vec<&Panel> {
    let mut members = ZIndexManager::panels_in_layer(panels, layer);
    members.sort_by_key(|p| p.z_index);
    members
}

fn with_z_index(panels: &[Panel], panel_id: &PanelId, z_index: i64) -> Vec<Panel> {
    panels
        .iter()
        .map(|p| if &p.id == panel_id { p.clone().with_z_index(z_index) } else { p.clone() })
        .collect()
}

fn unknown_panel(panel_id: &PanelId, panels: &[Panel]) -> Vec<Panel> {
    log::debug!("z-index operation on unknown panel {}", panel_id);
    panels.to_vec()
}
