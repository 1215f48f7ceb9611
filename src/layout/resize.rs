// Resize validation.
//
// validate_resize_operation runs a requested size through every configured
// constraint in a fixed order:
//   1. min/max clamp (content padding raises the minimum)
//   2. aspect ratio
//   3. viewport boundary
//   4. collision against neighbours (with a minimum gap)
//   5. common-size / grid snapping
//
// Clamps that break a hard limit and collisions are violations. Corrections
// the engine makes on its own (aspect ratio, viewport, snapping) are warnings.
// `constrained_size` is what the caller must apply.
//
// Steps 3 and 4 look at the panel where it will sit: the edges opposite the
// resize handle stay fixed (top-left for validate_resize_operation).
//
// The second half of the file turns pointer deltas on a resize handle into a
// new origin + size.

use serde::{Deserialize, Serialize};

use super::collision::CollisionResolver;
use super::grid_snap::snap_axis;
use super::spatial_grid::{SpatialIndex, DEFAULT_CELL_SIZE};
use super::{Point, Rect, Size};
use crate::panel::{Panel, PanelId};

pub const DEFAULT_MIN_SIZE: Size = Size::new(100.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AspectRatioConstraint {
    /// Target width / height.
    pub ratio: f64,
    #[serde(default)]
    pub tolerance: f64,
    #[serde(default)]
    pub enforce_on_resize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl ContentPadding {
    pub fn uniform(value: f64) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportConstraint {
    pub size: Size,
    #[serde(default)]
    pub margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapConstraint {
    pub enabled: bool,
    /// Preferred sizes, tried before grid snapping.
    pub common_sizes: Vec<Size>,
    pub grid_size: f64,
    pub snap_distance: f64,
}

impl Default for SnapConstraint {
    fn default() -> Self {
        Self { enabled: true, common_sizes: Vec::new(), grid_size: 20.0, snap_distance: 10.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollisionPolicy {
    pub prevent_overlap: bool,
    /// Required clearance between panels.
    pub minimum_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResizeConstraints {
    pub min_size: Size,
    pub max_size: Option<Size>,
    pub aspect_ratio: Option<AspectRatioConstraint>,
    pub content_padding: Option<ContentPadding>,
    pub viewport: Option<ViewportConstraint>,
    pub snap: Option<SnapConstraint>,
    pub collision: Option<CollisionPolicy>,
}

impl Default for ResizeConstraints {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: None,
            aspect_ratio: None,
            content_padding: None,
            viewport: None,
            snap: None,
            collision: None,
        }
    }
}

impl ResizeConstraints {
    /// Constraints seeded from the limits a panel carries.
    pub fn for_panel(panel: &Panel) -> Self {
        let limits = panel.constraints.unwrap_or_default();
        Self {
            min_size: limits.min_size.unwrap_or(DEFAULT_MIN_SIZE),
            max_size: limits.max_size,
            ..Self::default()
        }
    }

    /// Minimum size, raised so the content padding always fits.
    pub fn effective_min_size(&self) -> Size {
        let mut min = self.min_size;
        if let Some(p) = self.content_padding {
            min.width = min.width.max(p.left + p.right);
            min.height = min.height.max(p.top + p.bottom);
        }
        min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    MinWidth,
    MinHeight,
    MaxWidth,
    MaxHeight,
    Collision,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    pub kind: ViolationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_id: Option<PanelId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    AspectRatio,
    Viewport,
    CommonSize,
    GridSnap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintWarning {
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentReason {
    MinSize,
    MaxSize,
    AspectRatio,
    Viewport,
    CollisionGap,
    CommonSize,
    GridSnap,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeAdjustment {
    pub reason: AdjustmentReason,
    pub from: Size,
    pub to: Size,
    /// False for suggestions the caller may apply itself (collision clearance).
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeValidation {
    pub is_valid: bool,
    pub constrained_size: Size,
    pub violations: Vec<ConstraintViolation>,
    pub warnings: Vec<ConstraintWarning>,
    pub adjustments: Vec<SizeAdjustment>,
}

#[derive(Debug)]
struct Validation {
    size: Size,
    violations: Vec<ConstraintViolation>,
    warnings: Vec<ConstraintWarning>,
    adjustments: Vec<SizeAdjustment>,
}

impl Validation {
    fn violation(&mut self, kind: ViolationKind, message: String) {
        self.violations.push(ConstraintViolation { kind, message, panel_id: None });
    }

    fn warning(&mut self, kind: WarningKind, message: String) {
        self.warnings.push(ConstraintWarning { kind, message });
    }

    /// Replace the working size and record the change.
    fn adjust(&mut self, reason: AdjustmentReason, to: Size) {
        self.adjustments.push(SizeAdjustment { reason, from: self.size, to, applied: true });
        self.size = to;
    }
}

pub fn validate_resize_operation(
    panel: &Panel,
    new_size: Size,
    constraints: &ResizeConstraints,
    other_panels: &[Panel],
) -> ResizeValidation {
    validate_resize_from_handle(panel, ResizeHandle::Se, new_size, constraints, other_panels)
}

/// Validate a resize dragged from `handle`. The edges opposite the handle stay
/// put, so the viewport and collision steps check the origin the panel will
/// actually have at each candidate size.
pub fn validate_resize_from_handle(
    panel: &Panel,
    handle: ResizeHandle,
    new_size: Size,
    constraints: &ResizeConstraints,
    other_panels: &[Panel],
) -> ResizeValidation {
    let frame = Frame { panel, handle };
    let neighbours = Neighbours::new(panel, constraints, other_panels);
    let mut v = Validation { size: new_size, violations: Vec::new(), warnings: Vec::new(), adjustments: Vec::new() };

    clamp_min_max(&mut v, constraints);
    enforce_aspect_ratio(&mut v, constraints);
    clamp_to_viewport(&mut v, &frame, constraints);
    check_collisions(&mut v, &frame, neighbours.as_ref());
    snap_size(&mut v, &frame, constraints, neighbours.as_ref());

    log::trace!(
        "resize {} {:?} -> {:?}: {} violations, {} warnings",
        panel.id,
        new_size,
        v.size,
        v.violations.len(),
        v.warnings.len()
    );

    ResizeValidation {
        is_valid: v.violations.is_empty(),
        constrained_size: v.size,
        violations: v.violations,
        warnings: v.warnings,
        adjustments: v.adjustments,
    }
}

/// The panel being resized and the handle that drives it.
struct Frame<'a> {
    panel: &'a Panel,
    handle: ResizeHandle,
}

impl Frame<'_> {
    fn origin_for(&self, size: Size) -> Point {
        anchored_position(self.panel.position, self.panel.size, self.handle, size)
    }

    fn rect_for(&self, size: Size) -> Rect {
        Rect::from_parts(self.origin_for(size), size)
    }

    /// Edges that stay fixed while the handle moves.
    fn fixed_right(&self) -> f64 {
        self.panel.position.x + self.panel.size.width
    }

    fn fixed_bottom(&self) -> f64 {
        self.panel.position.y + self.panel.size.height
    }
}

/// Other panels indexed once per validation, present only when the
/// constraints ask for overlap prevention.
struct Neighbours<'a> {
    panel_id: &'a PanelId,
    index: SpatialIndex,
    gap: f64,
}

impl<'a> Neighbours<'a> {
    fn new(panel: &'a Panel, constraints: &ResizeConstraints, others: &[Panel]) -> Option<Self> {
        let policy = constraints.collision.filter(|c| c.prevent_overlap)?;
        Some(Self {
            panel_id: &panel.id,
            index: SpatialIndex::from_panels(others, DEFAULT_CELL_SIZE),
            gap: policy.minimum_gap.max(0.0),
        })
    }

    fn hits(&self, rect: &Rect) -> Vec<PanelId> {
        CollisionResolver::new(&self.index).find_collisions(&rect.inflate(self.gap), Some(self.panel_id)).panels
    }
}

fn size_limits(constraints: &ResizeConstraints) -> (Size, Size) {
    let min = constraints.effective_min_size();
    let max = constraints.max_size.unwrap_or(Size::new(f64::INFINITY, f64::INFINITY));
    (min, max)
}

fn within_limits(size: &Size, min: Size, max: Size) -> bool {
    size.width >= min.width && size.width <= max.width && size.height >= min.height && size.height <= max.height
}

fn clamp_min_max(v: &mut Validation, constraints: &ResizeConstraints) {
    let min = constraints.effective_min_size();
    if v.size.width < min.width {
        v.violation(ViolationKind::MinWidth, format!("width {} is below minimum {}", v.size.width, min.width));
        v.adjust(AdjustmentReason::MinSize, Size { width: min.width, ..v.size });
    }
    if v.size.height < min.height {
        v.violation(ViolationKind::MinHeight, format!("height {} is below minimum {}", v.size.height, min.height));
        v.adjust(AdjustmentReason::MinSize, Size { height: min.height, ..v.size });
    }

    let Some(max) = constraints.max_size else { return };
    if v.size.width > max.width {
        v.violation(ViolationKind::MaxWidth, format!("width {} exceeds maximum {}", v.size.width, max.width));
        v.adjust(AdjustmentReason::MaxSize, Size { width: max.width, ..v.size });
    }
    if v.size.height > max.height {
        v.violation(ViolationKind::MaxHeight, format!("height {} exceeds maximum {}", v.size.height, max.height));
        v.adjust(AdjustmentReason::MaxSize, Size { height: max.height, ..v.size });
    }
}

/// Shrinks the dimension that is too large for the ratio. When that would
/// break the size limits the other dimension grows instead; when both would,
/// the size is left alone with a warning.
fn enforce_aspect_ratio(v: &mut Validation, constraints: &ResizeConstraints) {
    let Some(ar) = constraints.aspect_ratio else { return };
    if !ar.enforce_on_resize || !(ar.ratio.is_finite() && ar.ratio > 0.0) || v.size.height <= 0.0 {
        return;
    }
    let current = v.size.width / v.size.height;
    if (current - ar.ratio).abs() <= ar.tolerance {
        return;
    }
    let by_width = Size { width: v.size.height * ar.ratio, ..v.size };
    let by_height = Size { height: v.size.width / ar.ratio, ..v.size };
    let candidates = if current > ar.ratio { [by_width, by_height] } else { [by_height, by_width] };

    let (min, max) = size_limits(constraints);
    match candidates.into_iter().find(|c| within_limits(c, min, max)) {
        Some(corrected) => {
            v.warning(
                WarningKind::AspectRatio,
                format!("aspect ratio {:.3} corrected to {:.3}", current, ar.ratio),
            );
            v.adjust(AdjustmentReason::AspectRatio, corrected);
        }
        None => v.warning(
            WarningKind::AspectRatio,
            format!("aspect ratio {:.3} cannot reach {:.3} within the size limits", current, ar.ratio),
        ),
    }
}

fn clamp_to_viewport(v: &mut Validation, frame: &Frame, constraints: &ResizeConstraints) {
    let Some(vp) = constraints.viewport else { return };
    let start = frame.panel.position;
    let max_w = if frame.handle.moves_left_edge() {
        frame.fixed_right() - vp.margin
    } else {
        vp.size.width - vp.margin - start.x
    };
    let max_h = if frame.handle.moves_top_edge() {
        frame.fixed_bottom() - vp.margin
    } else {
        vp.size.height - vp.margin - start.y
    };
    let mut clamped = v.size;
    if max_w > 0.0 && clamped.width > max_w {
        clamped.width = max_w;
    }
    if max_h > 0.0 && clamped.height > max_h {
        clamped.height = max_h;
    }
    if clamped != v.size {
        v.warning(WarningKind::Viewport, "size clamped to the viewport".to_string());
        v.adjust(AdjustmentReason::Viewport, clamped);
    }
}

fn check_collisions(v: &mut Validation, frame: &Frame, neighbours: Option<&Neighbours>) {
    let Some(n) = neighbours else { return };
    for id in n.hits(&frame.rect_for(v.size)) {
        let Some(other) = n.index.rect_of(&id) else { continue };
        v.violations.push(ConstraintViolation {
            kind: ViolationKind::Collision,
            message: format!("would overlap panel {} (gap {})", id, n.gap),
            panel_id: Some(id),
        });
        if let Some(safe) = safe_size(frame, v.size, &other, n.gap) {
            v.adjustments.push(SizeAdjustment {
                reason: AdjustmentReason::CollisionGap,
                from: v.size,
                to: safe,
                applied: false,
            });
        }
    }
}

/// Largest size that keeps `gap` clear of `other`, shrinking one axis only
/// by pulling back the dragged edge. None when the neighbour sits behind the
/// fixed edges and no shrink can help.
fn safe_size(frame: &Frame, size: Size, other: &Rect, gap: f64) -> Option<Size> {
    let start = frame.panel.position;
    let width = if frame.handle.moves_left_edge() {
        (other.right() < frame.fixed_right()).then(|| frame.fixed_right() - other.right() - gap)
    } else {
        (other.x > start.x).then(|| other.x - start.x - gap)
    };
    let height = if frame.handle.moves_top_edge() {
        (other.bottom() < frame.fixed_bottom()).then(|| frame.fixed_bottom() - other.bottom() - gap)
    } else {
        (other.y > start.y).then(|| other.y - start.y - gap)
    };
    match (width.filter(|w| *w >= 0.0), height.filter(|h| *h >= 0.0)) {
        (Some(w), Some(h)) => {
            if size.width - w <= size.height - h {
                Some(Size { width: w, ..size })
            } else {
                Some(Size { height: h, ..size })
            }
        }
        (Some(w), None) => Some(Size { width: w, ..size }),
        (None, Some(h)) => Some(Size { height: h, ..size }),
        (None, None) => None,
    }
}

/// Snapping is a nicety: it never pushes a dimension out of its min/max
/// range and never turns a clear resize into a colliding one.
fn snap_size(v: &mut Validation, frame: &Frame, constraints: &ResizeConstraints, neighbours: Option<&Neighbours>) {
    let Some(snap) = &constraints.snap else { return };
    if !snap.enabled {
        return;
    }
    let d = snap.snap_distance.max(0.0);
    let (min, max) = size_limits(constraints);
    let is_clear = |size: Size| neighbours.is_none_or(|n| n.hits(&frame.rect_for(size)).is_empty());
    let was_clear = is_clear(v.size);
    let keeps_clear = |size: Size| !was_clear || is_clear(size);

    let common = snap
        .common_sizes
        .iter()
        .filter(|cs| (cs.width - v.size.width).abs() <= d && (cs.height - v.size.height).abs() <= d)
        .filter(|cs| within_limits(cs, min, max) && keeps_clear(**cs))
        .min_by(|a, b| {
            let da = (a.width - v.size.width).abs() + (a.height - v.size.height).abs();
            let db = (b.width - v.size.width).abs() + (b.height - v.size.height).abs();
            da.total_cmp(&db)
        })
        .copied();
    if let Some(cs) = common {
        if cs != v.size {
            v.warning(WarningKind::CommonSize, format!("snapped to common size {}x{}", cs.width, cs.height));
            v.adjust(AdjustmentReason::CommonSize, cs);
        }
        return;
    }

    if !(snap.grid_size.is_finite() && snap.grid_size > 0.0) {
        return;
    }
    let mut snapped = v.size;
    let w = snap_axis(v.size.width, snap.grid_size, d);
    if w >= min.width && w <= max.width {
        snapped.width = w;
    }
    let h = snap_axis(v.size.height, snap.grid_size, d);
    if h >= min.height && h <= max.height {
        snapped.height = h;
    }
    if snapped != v.size && keeps_clear(snapped) {
        v.warning(WarningKind::GridSnap, format!("snapped to grid {}", snap.grid_size));
        v.adjust(AdjustmentReason::GridSnap, snapped);
    }
}

/// Which edge or corner of a panel is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub fn moves_left_edge(&self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::Nw | ResizeHandle::Sw)
    }

    pub fn moves_top_edge(&self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::Ne | ResizeHandle::Nw)
    }

    pub fn moves_right_edge(&self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::Ne | ResizeHandle::Se)
    }

    pub fn moves_bottom_edge(&self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::Se | ResizeHandle::Sw)
    }
}

/// Apply a pointer delta to the dragged edges. Edges never cross, so the
/// size stays non-negative; dragging a north/west edge moves the origin.
pub fn apply_resize_handle(position: Point, size: Size, handle: ResizeHandle, delta: Point) -> (Point, Size) {
    let mut left = position.x;
    let mut top = position.y;
    let mut right = position.x + size.width;
    let mut bottom = position.y + size.height;

    if handle.moves_left_edge() {
        left = (left + delta.x).min(right);
    }
    if handle.moves_right_edge() {
        right = (right + delta.x).max(left);
    }
    if handle.moves_top_edge() {
        top = (top + delta.y).min(bottom);
    }
    if handle.moves_bottom_edge() {
        bottom = (bottom + delta.y).max(top);
    }

    (Point::new(left, top), Size::new(right - left, bottom - top))
}

/// Origin for a panel resized from `handle` to `size`, keeping the edges
/// opposite the handle where they were at `start`.
pub fn anchored_position(start: Point, start_size: Size, handle: ResizeHandle, size: Size) -> Point {
    let x = if handle.moves_left_edge() { start.x + start_size.width - size.width } else { start.x };
    let y = if handle.moves_top_edge() { start.y + start_size.height - size.height } else { start.y };
    Point::new(x, y)
}

/// Clamp `position` so the rectangle stays inside `viewport` minus `margin`.
/// Rectangles larger than the space available stick to the top-left margin.
pub fn constrain_position_to_viewport(position: Point, size: Size, viewport: Size, margin: f64) -> Point {
    let max_x = (viewport.width - margin - size.width).max(margin);
    let max_y = (viewport.height - margin - size.height).max(margin);
    Point::new(position.x.clamp(margin, max_x), position.y.clamp(margin, max_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel(id: &str, x: f64, y: f64, w: f64, h: f64) -> Panel {
        Panel::new(id, Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_min_clamp_is_violation() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints { min_size: Size::new(100.0, 100.0), ..Default::default() };
        let result = validate_resize_operation(&p, Size::new(50.0, 50.0), &constraints, &[]);

        assert!(!result.is_valid);
        assert_eq!(result.constrained_size, Size::new(100.0, 100.0));
        assert_eq!(result.violations.len(), 2);
        assert_eq!(result.violations[0].kind, ViolationKind::MinWidth);
        assert_eq!(result.violations[1].kind, ViolationKind::MinHeight);
        assert_eq!(result.adjustments.len(), 2);
    }

    #[test]
    fn test_max_clamp() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            max_size: Some(Size::new(400.0, 300.0)),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(500.0, 250.0), &constraints, &[]);
        assert_eq!(result.constrained_size, Size::new(400.0, 250.0));
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].kind, ViolationKind::MaxWidth);
    }

    #[test]
    fn test_within_limits_is_valid_and_untouched() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let result = validate_resize_operation(&p, Size::new(250.0, 180.0), &ResizeConstraints::default(), &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(250.0, 180.0));
        assert!(result.adjustments.is_empty());
    }

    #[test]
    fn test_content_padding_raises_minimum() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            min_size: Size::new(50.0, 50.0),
            content_padding: Some(ContentPadding::uniform(40.0)),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(60.0, 60.0), &constraints, &[]);
        assert_eq!(result.constrained_size, Size::new(80.0, 80.0));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_aspect_ratio_is_warning() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            aspect_ratio: Some(AspectRatioConstraint { ratio: 2.0, tolerance: 0.05, enforce_on_resize: true }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(400.0, 400.0), &constraints, &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(400.0, 200.0));
        assert_eq!(result.warnings[0].kind, WarningKind::AspectRatio);

        let wide = validate_resize_operation(&p, Size::new(600.0, 200.0), &constraints, &[]);
        assert_eq!(wide.constrained_size, Size::new(400.0, 200.0));
    }

    #[test]
    fn test_aspect_ratio_not_enforced() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            aspect_ratio: Some(AspectRatioConstraint { ratio: 2.0, tolerance: 0.05, enforce_on_resize: false }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(400.0, 400.0), &constraints, &[]);
        assert_eq!(result.constrained_size, Size::new(400.0, 400.0));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_viewport_clamp_is_warning() {
        let p = panel("p", 100.0, 100.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            viewport: Some(ViewportConstraint { size: Size::new(800.0, 600.0), margin: 20.0 }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(900.0, 300.0), &constraints, &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(680.0, 300.0));
        assert_eq!(result.warnings[0].kind, WarningKind::Viewport);
    }

    #[test]
    fn test_collision_with_gap_offers_safe_size() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let neighbour = panel("n", 310.0, 0.0, 100.0, 100.0);
        let constraints = ResizeConstraints {
            collision: Some(CollisionPolicy { prevent_overlap: true, minimum_gap: 10.0 }),
            ..Default::default()
        };

        // 300 wide leaves exactly 10 units: fine.
        let ok = validate_resize_operation(&p, Size::new(300.0, 200.0), &constraints, &[neighbour.clone()]);
        assert!(ok.is_valid);

        let bad = validate_resize_operation(&p, Size::new(305.0, 200.0), &constraints, &[neighbour]);
        assert!(!bad.is_valid);
        assert_eq!(bad.violations[0].kind, ViolationKind::Collision);
        assert_eq!(bad.violations[0].panel_id, Some(PanelId::from("n")));
        let offer = bad.adjustments.iter().find(|a| a.reason == AdjustmentReason::CollisionGap).unwrap();
        assert_eq!(offer.to, Size::new(300.0, 200.0));
        assert!(!offer.applied);
        assert_eq!(bad.constrained_size, Size::new(305.0, 200.0));
    }

    #[test]
    fn test_collision_ignores_self_in_others() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            collision: Some(CollisionPolicy { prevent_overlap: true, minimum_gap: 0.0 }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(300.0, 300.0), &constraints, &[p.clone()]);
        assert!(result.is_valid);
    }

    #[test]
    fn test_common_size_snap_wins_over_grid() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            snap: Some(SnapConstraint {
                common_sizes: vec![Size::new(320.0, 240.0)],
                grid_size: 20.0,
                snap_distance: 10.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(315.0, 246.0), &constraints, &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(320.0, 240.0));
        assert_eq!(result.warnings[0].kind, WarningKind::CommonSize);
    }

    #[test]
    fn test_grid_snap_fallback() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            snap: Some(SnapConstraint { grid_size: 20.0, snap_distance: 5.0, ..Default::default() }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(318.0, 251.0), &constraints, &[]);
        assert_eq!(result.constrained_size, Size::new(320.0, 251.0));
        assert_eq!(result.warnings[0].kind, WarningKind::GridSnap);
    }

    #[test]
    fn test_grid_snap_keeps_minimum() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            min_size: Size::new(105.0, 105.0),
            snap: Some(SnapConstraint { grid_size: 20.0, snap_distance: 10.0, ..Default::default() }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(106.0, 106.0), &constraints, &[]);
        // 100 would be closer on the grid but breaks the minimum, 106 stays.
        assert_eq!(result.constrained_size, Size::new(106.0, 106.0));
    }

    #[test]
    fn test_aspect_ratio_respects_size_limits() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let mut constraints = ResizeConstraints {
            aspect_ratio: Some(AspectRatioConstraint { ratio: 2.0, tolerance: 0.0, enforce_on_resize: true }),
            ..Default::default()
        };
        // Halving the height would drop it to 75; widening keeps the minimum.
        let result = validate_resize_operation(&p, Size::new(150.0, 100.0), &constraints, &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(200.0, 100.0));

        // Neither correction fits under the maximum: keep the size and warn.
        constraints.aspect_ratio = Some(AspectRatioConstraint { ratio: 4.0, tolerance: 0.0, enforce_on_resize: true });
        constraints.max_size = Some(Size::new(150.0, 150.0));
        let result = validate_resize_operation(&p, Size::new(120.0, 120.0), &constraints, &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(120.0, 120.0));
        assert_eq!(result.warnings[0].kind, WarningKind::AspectRatio);
        assert!(result.adjustments.is_empty());
    }

    #[test]
    fn test_common_size_outside_limits_is_skipped() {
        let p = panel("p", 0.0, 0.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            snap: Some(SnapConstraint {
                common_sizes: vec![Size::new(95.0, 120.0)],
                grid_size: 20.0,
                snap_distance: 10.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        let result = validate_resize_operation(&p, Size::new(102.0, 118.0), &constraints, &[]);
        assert!(result.is_valid);
        assert_eq!(result.constrained_size, Size::new(100.0, 120.0));
        assert_eq!(result.warnings[0].kind, WarningKind::GridSnap);
    }

    #[test]
    fn test_viewport_clamp_from_west_handle() {
        let p = panel("p", 100.0, 100.0, 200.0, 200.0);
        let constraints = ResizeConstraints {
            viewport: Some(ViewportConstraint { size: Size::new(800.0, 600.0), margin: 20.0 }),
            ..Default::default()
        };
        // The east edge stays at 300, so the west edge may reach the margin at 20.
        let result = validate_resize_from_handle(&p, ResizeHandle::W, Size::new(400.0, 200.0), &constraints, &[]);
        assert_eq!(result.constrained_size, Size::new(280.0, 200.0));
        let origin = anchored_position(p.position, p.size, ResizeHandle::W, result.constrained_size);
        assert_eq!(origin, Point::new(20.0, 100.0));
    }

    #[test]
    fn test_collision_from_north_west_offers_safe_size() {
        let p = panel("p", 100.0, 100.0, 200.0, 200.0);
        let neighbour = panel("n", 200.0, 0.0, 50.0, 50.0);
        let constraints = ResizeConstraints {
            collision: Some(CollisionPolicy { prevent_overlap: true, minimum_gap: 0.0 }),
            ..Default::default()
        };
        let result = validate_resize_from_handle(&p, ResizeHandle::Nw, Size::new(150.0, 300.0), &constraints, &[neighbour]);
        assert!(!result.is_valid);
        // Pulling the top edge down to the neighbour's bottom costs the least.
        let offer = result.adjustments.iter().find(|a| a.reason == AdjustmentReason::CollisionGap).unwrap();
        assert_eq!(offer.to, Size::new(150.0, 250.0));
    }

    #[test]
    fn test_handle_geometry() {
        let start = Point::new(100.0, 100.0);
        let size = Size::new(200.0, 100.0);

        let (p, s) = apply_resize_handle(start, size, ResizeHandle::Se, Point::new(50.0, 20.0));
        assert_eq!(p, start);
        assert_eq!(s, Size::new(250.0, 120.0));

        let (p, s) = apply_resize_handle(start, size, ResizeHandle::Nw, Point::new(-30.0, 10.0));
        assert_eq!(p, Point::new(70.0, 110.0));
        assert_eq!(s, Size::new(230.0, 90.0));

        // Dragging the west edge past the east edge collapses to zero width.
        let (p, s) = apply_resize_handle(start, size, ResizeHandle::W, Point::new(500.0, 0.0));
        assert_eq!(p.x, 300.0);
        assert_eq!(s.width, 0.0);
    }

    #[test]
    fn test_anchored_position_for_north_west() {
        let p = anchored_position(Point::new(100.0, 100.0), Size::new(200.0, 200.0), ResizeHandle::Nw, Size::new(150.0, 120.0));
        assert_eq!(p, Point::new(150.0, 180.0));
        let p = anchored_position(Point::new(100.0, 100.0), Size::new(200.0, 200.0), ResizeHandle::Se, Size::new(150.0, 120.0));
        assert_eq!(p, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_constrain_position_to_viewport() {
        let vp = Size::new(800.0, 600.0);
        assert_eq!(
            constrain_position_to_viewport(Point::new(750.0, -20.0), Size::new(100.0, 100.0), vp, 10.0),
            Point::new(690.0, 10.0)
        );
        assert_eq!(
            constrain_position_to_viewport(Point::new(50.0, 50.0), Size::new(1000.0, 100.0), vp, 10.0),
            Point::new(10.0, 50.0)
        );
    }
}
