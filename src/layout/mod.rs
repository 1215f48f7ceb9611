// Panel layout engine.
//
// Answers geometry questions for a set of panels owned by the caller:
// - where a panel may sit without overlapping its neighbours
// - how positions and sizes snap to a grid
// - how a resize is constrained by limits, aspect ratio, viewport and neighbours
//
// Nothing in here mutates caller state. Every operation takes panel snapshots
// and returns new positions/sizes for the caller to apply.
//
// Submodules:
// - spatial_grid: uniform bucket grid for sub-linear overlap queries
// - collision: overlap detection, spiral search, push-away
// - grid_snap: magnetic grid snapping and grid line generation
// - resize: composite resize validation and handle geometry
// - placement: admission checks for new panels

use serde::{Deserialize, Serialize};

pub mod collision;
pub mod grid_snap;
pub mod placement;
pub mod resize;
pub mod spatial_grid;

use grid_snap::GridSettings;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point { x: self.x + dx, y: self.y + dy }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle. Used for panels and for arbitrary query regions.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Negative extents are clamped to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width: width.max(0.0), height: height.max(0.0) }
    }

    pub fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 { self.x + self.width }
    pub fn bottom(&self) -> f64 { self.y + self.height }
    pub fn area(&self) -> f64 { self.width * self.height }

    pub fn origin(&self) -> Point {
        Point { x: self.x, y: self.y }
    }

    pub fn size(&self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Touching edges do not count as overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

/// Tunables for a [`crate::engine::LayoutEngine`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Spatial index bucket size. Too small fans each panel out into many
    /// buckets; too large degenerates into a linear scan.
    pub cell_size: f64,
    pub grid: GridSettings,
    /// Distance between consecutive z-indices inside a layer.
    pub z_index_spacing: i64,
    /// Number of z-index operations kept for undo.
    pub history_capacity: usize,
    /// Spiral search radius for overlap prevention.
    pub search_radius: f64,
    pub search_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cell_size: spatial_grid::DEFAULT_CELL_SIZE,
            grid: GridSettings::default(),
            z_index_spacing: crate::zindex::DEFAULT_SPACING,
            history_capacity: crate::zindex::DEFAULT_HISTORY_CAPACITY,
            search_radius: collision::DEFAULT_SEARCH_RADIUS,
            search_step: collision::DEFAULT_SEARCH_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_rects() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert!(a.overlaps(&b));
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let right = Rect::new(100.0, 0.0, 50.0, 50.0);
        let below = Rect::new(0.0, 100.0, 50.0, 50.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert_eq!(a.intersection(&right), None);
    }

    #[test]
    fn test_contained_rect_intersection_is_inner() {
        let outer = Rect::new(0.0, 0.0, 200.0, 200.0);
        let inner = Rect::new(20.0, 30.0, 10.0, 10.0);
        assert_eq!(outer.intersection(&inner), Some(inner));
        assert!(outer.contains_rect(&inner));
    }

    #[test]
    fn test_negative_extents_clamped() {
        let r = Rect::new(5.0, 5.0, -10.0, 3.0);
        assert_eq!(r.width, 0.0);
        assert_eq!(r.height, 3.0);
    }

    #[test]
    fn test_inflate() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0).inflate(5.0);
        assert_eq!(r, Rect::new(5.0, 5.0, 30.0, 30.0));
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"cellSize": 150}"#).unwrap();
        assert_eq!(cfg.cell_size, 150.0);
        assert_eq!(cfg.z_index_spacing, 10);
        assert_eq!(cfg.history_capacity, 100);
        assert_eq!(cfg.grid.size, 20.0);
    }
}
