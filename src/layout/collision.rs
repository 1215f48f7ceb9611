// Collision detection and resolution.
//
// All exact overlap tests run against the candidates the spatial index hands
// back for the target rectangle, never against the full panel list.
//
// Resolution comes in two flavours:
// - prevent_overlap: move the *target* to the nearest free spot (spiral search)
// - push_away_overlapping: move the *neighbours* out of the target's way
//
// push_away is a single pass. Pushing one neighbour can land it on a third
// panel; that collision is left for the caller to notice.

use std::f64::consts::FRAC_1_SQRT_2;

use serde::{Deserialize, Serialize};

use super::spatial_grid::{SpatialIndex, DEFAULT_CELL_SIZE};
use super::{Point, Rect, Size};
use crate::panel::{Panel, PanelId};

pub const DEFAULT_SEARCH_RADIUS: f64 = 50.0;
pub const DEFAULT_SEARCH_STEP: f64 = 10.0;

/// Unit vectors for the eight 45° spiral directions, starting east and
/// turning clockwise in screen coordinates.
const SPIRAL_DIRECTIONS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Slack for `radius / step` landing just under a whole number.
const RING_EPSILON: f64 = 1e-9;

const CARDINAL_DIRECTIONS: [(f64, f64); 4] = [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)];

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionResult {
    pub colliding: bool,
    /// Colliding panels, in index insertion order.
    pub panels: Vec<PanelId>,
    /// Overlap region for each entry in `panels`.
    pub overlaps: Vec<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionPreview {
    pub is_valid: bool,
    pub collisions: Vec<PanelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_position: Option<Point>,
}

/// Bounds for the spiral search in [`CollisionResolver::prevent_overlap`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub radius: f64,
    pub step: f64,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { radius: DEFAULT_SEARCH_RADIUS, step: DEFAULT_SEARCH_STEP }
    }
}

impl SearchOptions {
    /// Replace unusable values so the search always terminates.
    fn sanitized(self) -> Self {
        let radius = if self.radius.is_finite() && self.radius > 0.0 { self.radius } else { 0.0 };
        let step = if self.step.is_finite() && self.step > 0.0 { self.step } else { DEFAULT_SEARCH_STEP };
        Self { radius, step }
    }

    /// Upper bound on the number of positions the search will test.
    pub fn max_candidates(&self) -> usize {
        let s = self.sanitized();
        1 + s.spiral_rings() * SPIRAL_DIRECTIONS.len() + s.cardinal_rings() * CARDINAL_DIRECTIONS.len()
    }

    fn spiral_rings(&self) -> usize {
        ring_count(self.radius, self.step)
    }

    /// Rings at `radius, radius + 2*step, .. 3*radius`.
    fn cardinal_rings(&self) -> usize {
        ring_count(2.0 * self.radius, 2.0 * self.step) + 1
    }
}

/// Whole steps that fit in `span`, tolerant of rounding in the division.
fn ring_count(span: f64, step: f64) -> usize {
    (span / step + RING_EPSILON).floor() as usize
}

/// Collision queries over a borrowed spatial index.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver<'a> {
    index: &'a SpatialIndex,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(index: &'a SpatialIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a SpatialIndex {
        self.index
    }

    pub fn find_collisions(&self, target: &Rect, exclude: Option<&PanelId>) -> CollisionResult {
        let mut result = CollisionResult::default();
        for (id, rect) in self.index.query_entries(target) {
            if Some(id) == exclude {
                continue;
            }
            if let Some(overlap) = target.intersection(&rect) {
                result.panels.push(id.clone());
                result.overlaps.push(overlap);
            }
        }
        result.colliding = !result.panels.is_empty();
        log::trace!("collision query {:?}: {} hits", target, result.panels.len());
        result
    }

    pub fn is_valid_position(
        &self,
        position: Point,
        size: Size,
        exclude: Option<&PanelId>,
        bounds: Option<&Rect>,
    ) -> bool {
        let rect = Rect::from_parts(position, size);
        if let Some(bounds) = bounds {
            if !bounds.contains_rect(&rect) {
                return false;
            }
        }
        !self.find_collisions(&rect, exclude).colliding
    }

    /// Nearest collision-free position around `position`.
    ///
    /// Tests the eight 45° directions at radii `step, 2*step, .. radius`, then
    /// the four cardinal directions at `radius ..= 3*radius` in `2*step`
    /// increments. If nothing is free the input position comes back unchanged.
    pub fn prevent_overlap(
        &self,
        position: Point,
        size: Size,
        bounds: Option<&Rect>,
        exclude: Option<&PanelId>,
        search: SearchOptions,
    ) -> Point {
        if self.is_valid_position(position, size, exclude, bounds) {
            return position;
        }
        let search = search.sanitized();

        for ring in 1..=search.spiral_rings() {
            let distance = ring as f64 * search.step;
            for (dx, dy) in SPIRAL_DIRECTIONS {
                let candidate = position.offset(dx * distance, dy * distance);
                if self.is_valid_position(candidate, size, exclude, bounds) {
                    return candidate;
                }
            }
        }

        for ring in 0..search.cardinal_rings() {
            let distance = search.radius + ring as f64 * 2.0 * search.step;
            for (dx, dy) in CARDINAL_DIRECTIONS {
                let candidate = position.offset(dx * distance, dy * distance);
                if self.is_valid_position(candidate, size, exclude, bounds) {
                    return candidate;
                }
            }
        }

        log::debug!("no free position within {} of {:?}", 3.0 * search.radius, position);
        position
    }

    /// Push every panel overlapping `moved` out of the way by the smallest
    /// separating translation (right, left, down or up), clamped to `bounds`.
    ///
    /// Returns the whole collection with the pushed panels updated. A single
    /// pass: pushed panels may end up overlapping other panels.
    pub fn push_away_overlapping(&self, moved: &Panel, panels: &[Panel], bounds: Option<&Rect>) -> Vec<Panel> {
        let moved_rect = moved.rect();
        let hits = self.find_collisions(&moved_rect, Some(&moved.id));
        if !hits.colliding {
            return panels.to_vec();
        }

        panels
            .iter()
            .map(|panel| {
                if panel.id == moved.id || !hits.panels.contains(&panel.id) {
                    return panel.clone();
                }
                let mut pushed = panel.clone();
                pushed.position = separate(&moved_rect, &panel.rect(), bounds);
                log::trace!("pushed {} from {:?} to {:?}", panel.id, panel.position, pushed.position);
                pushed
            })
            .collect()
    }

    pub fn collision_preview(
        &self,
        position: Point,
        size: Size,
        exclude: Option<&PanelId>,
        search: SearchOptions,
    ) -> CollisionPreview {
        let rect = Rect::from_parts(position, size);
        let hits = self.find_collisions(&rect, exclude);
        if !hits.colliding {
            return CollisionPreview { is_valid: true, collisions: Vec::new(), suggested_position: None };
        }
        let suggested = self.prevent_overlap(position, size, None, exclude, search);
        CollisionPreview {
            is_valid: false,
            collisions: hits.panels,
            suggested_position: (suggested != position).then_some(suggested),
        }
    }
}

/// New origin for `other` after the minimal push out of `mover`.
fn separate(mover: &Rect, other: &Rect, bounds: Option<&Rect>) -> Point {
    let push_right = mover.right() - other.x;
    let push_left = other.right() - mover.x;
    let push_down = mover.bottom() - other.y;
    let push_up = other.bottom() - mover.y;

    let options = [
        (push_right, push_right, 0.0),
        (push_left, -push_left, 0.0),
        (push_down, 0.0, push_down),
        (push_up, 0.0, -push_up),
    ];
    let (_, dx, dy) = options
        .into_iter()
        .fold((f64::INFINITY, 0.0, 0.0), |best, opt| if opt.0 < best.0 { opt } else { best });

    let mut target = Point::new(other.x + dx, other.y + dy);
    if let Some(b) = bounds {
        target.x = target.x.min(b.right() - other.width).max(b.x);
        target.y = target.y.min(b.bottom() - other.height).max(b.y);
    }
    target
}

pub fn find_collisions(panels: &[Panel], target: &Rect, exclude: Option<&PanelId>) -> CollisionResult {
    let index = SpatialIndex::from_panels(panels, DEFAULT_CELL_SIZE);
    CollisionResolver::new(&index).find_collisions(target, exclude)
}

pub fn is_valid_position(
    position: Point,
    size: Size,
    panels: &[Panel],
    exclude: Option<&PanelId>,
    bounds: Option<&Rect>,
) -> bool {
    let index = SpatialIndex::from_panels(panels, DEFAULT_CELL_SIZE);
    CollisionResolver::new(&index).is_valid_position(position, size, exclude, bounds)
}

pub fn prevent_overlap(
    position: Point,
    size: Size,
    panels: &[Panel],
    bounds: Option<&Rect>,
    exclude: Option<&PanelId>,
    search: SearchOptions,
) -> Point {
    let index = SpatialIndex::from_panels(panels, DEFAULT_CELL_SIZE);
    CollisionResolver::new(&index).prevent_overlap(position, size, bounds, exclude, search)
}

pub fn push_away_overlapping(moved: &Panel, panels: &[Panel], bounds: Option<&Rect>) -> Vec<Panel> {
    let index = SpatialIndex::from_panels(panels, DEFAULT_CELL_SIZE);
    CollisionResolver::new(&index).push_away_overlapping(moved, panels, bounds)
}

pub fn collision_preview(position: Point, size: Size, panels: &[Panel], exclude: Option<&PanelId>) -> CollisionPreview {
    let index = SpatialIndex::from_panels(panels, DEFAULT_CELL_SIZE);
    CollisionResolver::new(&index).collision_preview(position, size, exclude, SearchOptions::default())
}
