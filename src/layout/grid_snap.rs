//! Grid snapping.
//!
//! Snapping is magnetic: a coordinate only jumps to the grid when it is
//! already within a threshold of a grid line, otherwise it passes through.
//! A non-positive grid size disables snapping instead of failing.

use serde::{Deserialize, Serialize};

use super::{Point, Size};

pub const DEFAULT_GRID_SIZE: f64 = 20.0;
pub const DEFAULT_SNAP_THRESHOLD: f64 = 10.0;
pub const DEFAULT_MAJOR_MULTIPLIER: u32 = 5;
pub const DEFAULT_GRID_DENSITY: f64 = 20.0;

/// Cap on generated grid lines per axis.
const MAX_LINES_PER_AXIS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridSettings {
    pub enabled: bool,
    /// Cell size, must be positive for snapping to happen.
    pub size: f64,
    pub visible: bool,
    pub snap_threshold: f64,
    /// Every n-th line is a major line.
    pub major_grid_multiplier: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: DEFAULT_GRID_SIZE,
            visible: false,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            major_grid_multiplier: DEFAULT_MAJOR_MULTIPLIER,
        }
    }
}

impl GridSettings {
    /// True when these settings can actually snap something.
    pub fn is_active(&self) -> bool {
        self.enabled && usable_grid(self.size)
    }

    /// Snap with these settings, or pass the position through when inactive.
    pub fn snap(&self, position: Point) -> Point {
        if !self.is_active() {
            return position;
        }
        snap_to_grid(position, self.size, self.snap_threshold)
    }
}

fn usable_grid(grid_size: f64) -> bool {
    grid_size.is_finite() && grid_size > 0.0
}

/// Nearest multiple of `grid_size` to `value`, shifted by `offset`.
/// Adding 0.0 folds -0.0 into 0.0.
fn nearest_multiple(value: f64, grid_size: f64, offset: f64) -> f64 {
    ((value - offset) / grid_size).round() * grid_size + offset + 0.0
}

pub(crate) fn snap_axis(value: f64, grid_size: f64, threshold: f64) -> f64 {
    let nearest = nearest_multiple(value, grid_size, 0.0);
    if (nearest - value).abs() <= threshold { nearest } else { value }
}

/// Snap each axis independently, but only when it is within `threshold`
/// of the nearest grid line.
pub fn snap_to_grid(position: Point, grid_size: f64, threshold: f64) -> Point {
    if !usable_grid(grid_size) {
        return position;
    }
    Point {
        x: snap_axis(position.x, grid_size, threshold),
        y: snap_axis(position.y, grid_size, threshold),
    }
}

/// Where grid lines are anchored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum GridOrigin {
    #[default]
    TopLeft,
    /// Lines pass through the centre of a container of this size.
    Center { container: Size },
}

impl GridOrigin {
    fn offsets(&self, grid_size: f64) -> (f64, f64) {
        match self {
            GridOrigin::TopLeft => (0.0, 0.0),
            GridOrigin::Center { container } => {
                ((container.width / 2.0).rem_euclid(grid_size), (container.height / 2.0).rem_euclid(grid_size))
            }
        }
    }
}

/// Unconditional rounding to the nearest grid intersection.
pub fn find_nearest_grid_point(position: Point, grid_size: f64, origin: GridOrigin) -> Point {
    if !usable_grid(grid_size) {
        return position;
    }
    let (ox, oy) = origin.offsets(grid_size);
    Point {
        x: nearest_multiple(position.x, grid_size, ox),
        y: nearest_multiple(position.y, grid_size, oy),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MagneticSnap {
    pub position: Point,
    pub snapped: bool,
    /// Straight-line distance to the nearest grid point.
    pub distance: f64,
}

/// Snap to the nearest grid point when it is within `radius` (Euclidean).
pub fn magnetic_snap_to_grid(position: Point, grid_size: f64, radius: f64, enabled: bool) -> MagneticSnap {
    if !enabled || !usable_grid(grid_size) {
        return MagneticSnap { position, snapped: false, distance: 0.0 };
    }
    let nearest = find_nearest_grid_point(position, grid_size, GridOrigin::TopLeft);
    let distance = position.distance_to(&nearest);
    if distance <= radius {
        MagneticSnap { position: nearest, snapped: true, distance }
    } else {
        MagneticSnap { position, snapped: false, distance }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineOrientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLine {
    pub orientation: LineOrientation,
    /// x for vertical lines, y for horizontal ones.
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GridLines {
    pub major: Vec<GridLine>,
    pub minor: Vec<GridLine>,
}

impl GridLines {
    pub fn len(&self) -> usize {
        self.major.len() + self.minor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.major.is_empty() && self.minor.is_empty()
    }
}

/// Evenly spaced lines covering `container`, split into major and minor sets.
pub fn calculate_grid_lines(container: Size, settings: &GridSettings) -> GridLines {
    let mut lines = GridLines::default();
    if !usable_grid(settings.size) {
        return lines;
    }
    let axes = [
        (LineOrientation::Vertical, container.width),
        (LineOrientation::Horizontal, container.height),
    ];
    for (orientation, extent) in axes {
        if !(extent.is_finite() && extent >= 0.0) {
            continue;
        }
        let count = ((extent / settings.size).floor() as usize).min(MAX_LINES_PER_AXIS);
        for i in 0..=count {
            let line = GridLine { orientation, offset: i as f64 * settings.size };
            let multiplier = settings.major_grid_multiplier as usize;
            if multiplier > 0 && i % multiplier == 0 {
                lines.major.push(line);
            } else {
                lines.minor.push(line);
            }
        }
    }
    lines
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnappedRect {
    pub position: Point,
    pub size: Size,
}

/// Snap a rectangle's origin, and its size too when `snap_size` is set.
/// Both use the same threshold-gated rounding, per dimension.
pub fn snap_rectangle_to_grid(
    position: Point,
    size: Size,
    grid_size: f64,
    threshold: f64,
    snap_size: bool,
) -> SnappedRect {
    let position = snap_to_grid(position, grid_size, threshold);
    if !snap_size || !usable_grid(grid_size) {
        return SnappedRect { position, size };
    }
    let size = Size {
        width: snap_axis(size.width, grid_size, threshold),
        height: snap_axis(size.height, grid_size, threshold),
    };
    SnappedRect { position, size }
}

/// Grid size giving roughly `target_density` cells across the container,
/// rounded to a multiple of 5 and never below 10.
pub fn calculate_optimal_grid_size(container: Size, target_density: f64) -> f64 {
    let density = if target_density.is_finite() && target_density > 0.0 {
        target_density
    } else {
        DEFAULT_GRID_DENSITY
    };
    let raw = container.width / density;
    if !raw.is_finite() {
        return 10.0;
    }
    ((raw / 5.0).round() * 5.0).max(10.0)
}
