//! Bounded history of z-index changes for single-step undo.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::panel::PanelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZIndexOperation {
    BringToFront,
    SendToBack,
    BringForward,
    SendBackward,
    SetLayer,
    AutoArrange,
    Optimize,
}

impl ZIndexOperation {
    /// Bulk operations rewrite many panels at once and cannot be undone.
    pub fn is_bulk(self) -> bool {
        matches!(self, ZIndexOperation::AutoArrange | ZIndexOperation::Optimize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZIndexHistoryEntry {
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: f64,
    pub operation: ZIndexOperation,
    pub panel_id: PanelId,
    pub old_z_index: i64,
    pub new_z_index: i64,
}

/// Append-only ring: once `capacity` is exceeded the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct ZIndexHistory {
    entries: VecDeque<ZIndexHistoryEntry>,
    capacity: usize,
    next_id: u64,
}

impl ZIndexHistory {
    /// A capacity of 0 keeps no history at all.
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity.min(1024)), capacity, next_id: 1 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ZIndexHistoryEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ZIndexHistoryEntry> {
        self.entries.back()
    }

    pub fn record(&mut self, operation: ZIndexOperation, panel_id: PanelId, old_z_index: i64, new_z_index: i64) {
        if self.capacity == 0 {
            return;
        }
        let entry = ZIndexHistoryEntry {
            id: self.next_id,
            timestamp: now_millis(),
            operation,
            panel_id,
            old_z_index,
            new_z_index,
        };
        self.next_id += 1;
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::debug!("z-index history full, dropped entry {}", evicted.id);
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.entries.iter().any(|e| !e.operation.is_bulk())
    }

    /// Remove and return the most recent single-panel entry. Bulk entries
    /// recorded after it stay where they are.
    pub fn pop_last_single(&mut self) -> Option<ZIndexHistoryEntry> {
        let idx = self.entries.iter().rposition(|e| !e.operation.is_bulk())?;
        self.entries.remove(idx)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(target_arch = "wasm32")]
fn now_millis() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_millis() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = ZIndexHistory::new(3);
        for i in 0..5 {
            history.record(ZIndexOperation::BringToFront, PanelId::from("a"), i, i + 1);
        }
        assert_eq!(history.len(), 3);
        let ids: Vec<u64> = history.entries().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }

    #[test]
    fn test_zero_capacity_records_nothing() {
        let mut history = ZIndexHistory::new(0);
        history.record(ZIndexOperation::SendToBack, PanelId::from("a"), 1, 2);
        assert!(history.is_empty());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_pop_skips_bulk_entries() {
        let mut history = ZIndexHistory::new(10);
        history.record(ZIndexOperation::BringToFront, PanelId::from("a"), 2000, 2010);
        history.record(ZIndexOperation::AutoArrange, PanelId::from("b"), 2000, 2010);

        let popped = history.pop_last_single().unwrap();
        assert_eq!(popped.panel_id, PanelId::from("a"));
        assert_eq!(history.len(), 1);
        assert!(history.pop_last_single().is_none());
    }

    #[test]
    fn test_timestamps_are_set() {
        let mut history = ZIndexHistory::new(2);
        history.record(ZIndexOperation::SetLayer, PanelId::from("a"), 2000, 4010);
        assert!(history.last().unwrap().timestamp > 0.0);
    }
}
