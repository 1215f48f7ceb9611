// Spatial hash grid for panel overlap queries.
//
// Instead of checking a rectangle against every panel, the plane is divided
// into square buckets and each panel is registered in every bucket it touches.
// A query only visits the buckets under the query rectangle.
//
// The index is a cache derived from the caller's panel list. It is never kept
// in sync automatically: callers insert/remove as panels change, or rebuild
// from scratch when in doubt.
//
// Panels covering more than MAX_QUERY_CELLS buckets (or with non-finite
// geometry) are not bucketed at all. They sit in an oversized list that every
// query includes.

use rustc_hash::FxHashMap;

use super::Rect;
use crate::panel::{Panel, PanelId};

/// Default bucket size in layout units.
pub const DEFAULT_CELL_SIZE: f64 = 200.0;

/// Queries spanning more buckets than this scan the entries directly, and
/// panels spanning more are kept out of the buckets.
const MAX_QUERY_CELLS: i64 = 4096;

pub type CellKey = (i64, i64);

#[derive(Debug, Clone)]
struct IndexEntry {
    rect: Rect,
    /// Insertion sequence, keeps query results in a stable order.
    seq: u64,
    cells: Vec<CellKey>,
}

/// A uniform grid mapping bucket coordinates to the panels overlapping them.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: FxHashMap<CellKey, Vec<PanelId>>,
    entries: FxHashMap<PanelId, IndexEntry>,
    oversized: Vec<PanelId>,
    next_seq: u64,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE)
    }
}

impl SpatialIndex {
    /// Non-positive or non-finite cell sizes fall back to 1.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            cells: FxHashMap::default(),
            entries: FxHashMap::default(),
            oversized: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn from_panels(panels: &[Panel], cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        index.rebuild(panels);
        index
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.entries.contains_key(id)
    }

    /// Rectangle a panel was indexed with.
    pub fn rect_of(&self, id: &PanelId) -> Option<Rect> {
        self.entries.get(id).map(|e| e.rect)
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.cells.len()
    }

    /// Panels too large to bucket.
    pub fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    fn cell_span(&self, rect: &Rect) -> Option<(i64, i64, i64, i64)> {
        if !(rect.x.is_finite() && rect.y.is_finite() && rect.right().is_finite() && rect.bottom().is_finite()) {
            return None;
        }
        let min_x = (rect.x / self.cell_size).floor() as i64;
        let max_x = (rect.right() / self.cell_size).floor() as i64;
        let min_y = (rect.y / self.cell_size).floor() as i64;
        let max_y = (rect.bottom() / self.cell_size).floor() as i64;
        Some((min_x, max_x, min_y, max_y))
    }

    /// Buckets a rectangle covers. None when it covers more than
    /// `MAX_QUERY_CELLS` or its geometry is not finite.
    pub fn cells_for(&self, rect: &Rect) -> Option<Vec<CellKey>> {
        let (min_x, max_x, min_y, max_y) = self.cell_span(rect)?;
        let count = span_cells(min_x, max_x, min_y, max_y);
        if count > MAX_QUERY_CELLS {
            return None;
        }
        let mut cells = Vec::with_capacity(count as usize);
        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                cells.push((cx, cy));
            }
        }
        Some(cells)
    }

    /// Insert a panel. Re-inserting a known id replaces its old registration.
    pub fn insert(&mut self, panel: &Panel) {
        self.insert_rect(panel.id.clone(), panel.rect());
    }

    pub fn insert_rect(&mut self, id: PanelId, rect: Rect) {
        self.remove(&id);

        let cells = match self.cells_for(&rect) {
            Some(cells) => cells,
            None => {
                log::debug!("panel {} spans too many buckets, indexing as oversized", id);
                self.oversized.push(id.clone());
                Vec::new()
            }
        };
        for cell in &cells {
            self.cells.entry(*cell).or_default().push(id.clone());
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(id, IndexEntry { rect, seq, cells });
    }

    /// Remove a panel. Unknown ids are ignored.
    pub fn remove(&mut self, id: &PanelId) -> bool {
        let Some(entry) = self.entries.remove(id) else {
            return false;
        };
        if entry.cells.is_empty() {
            self.oversized.retain(|other| other != id);
        }
        for cell in &entry.cells {
            if let Some(bucket) = self.cells.get_mut(cell) {
                bucket.retain(|other| other != id);
                if bucket.is_empty() {
                    self.cells.remove(cell);
                }
            }
        }
        true
    }

    /// Candidate panels that might overlap `rect`, in insertion order.
    /// This is a superset of the true overlaps; callers still run exact checks.
    pub fn query(&self, rect: &Rect) -> Vec<&PanelId> {
        self.query_entries(rect).into_iter().map(|(id, _)| id).collect()
    }

    /// Like [`query`](Self::query) but also yields the indexed rectangles.
    pub fn query_entries(&self, rect: &Rect) -> Vec<(&PanelId, Rect)> {
        let mut found: Vec<(&PanelId, &IndexEntry)> = match self.cell_span(rect) {
            Some((min_x, max_x, min_y, max_y)) if span_cells(min_x, max_x, min_y, max_y) <= MAX_QUERY_CELLS =>
            {
                let mut seen = rustc_hash::FxHashSet::default();
                let mut found = Vec::new();
                for id in &self.oversized {
                    if seen.insert(id) {
                        if let Some((key, entry)) = self.entries.get_key_value(id) {
                            found.push((key, entry));
                        }
                    }
                }
                for cx in min_x..=max_x {
                    for cy in min_y..=max_y {
                        let Some(bucket) = self.cells.get(&(cx, cy)) else { continue };
                        for id in bucket {
                            if seen.insert(id) {
                                if let Some((key, entry)) = self.entries.get_key_value(id) {
                                    found.push((key, entry));
                                }
                            }
                        }
                    }
                }
                found
            }
            // Huge or degenerate query: every entry is a candidate.
            _ => self.entries.iter().collect(),
        };
        found.sort_by_key(|(_, entry)| entry.seq);
        found.into_iter().map(|(id, entry)| (id, entry.rect)).collect()
    }

    /// Drop everything and index `panels` from scratch.
    pub fn rebuild(&mut self, panels: &[Panel]) {
        self.clear();
        for panel in panels {
            self.insert(panel);
        }
        log::trace!("spatial index rebuilt: {} panels in {} buckets", self.len(), self.bucket_count());
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
        self.next_seq = 0;
    }
}

fn span_cells(min_x: i64, max_x: i64, min_y: i64, max_y: i64) -> i64 {
    let w = max_x.saturating_sub(min_x).saturating_add(1);
    let h = max_y.saturating_sub(min_y).saturating_add(1);
    w.saturating_mul(h)
}
