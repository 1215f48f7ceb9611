//! End-to-end scenarios through the public API.

use panel_layout_core::layout::grid_snap::snap_to_grid;
use panel_layout_core::layout::placement::{find_first_free_position, initial_z_index};
use panel_layout_core::layout::resize::{validate_resize_operation, ViolationKind};
use panel_layout_core::zindex::DEFAULT_SPACING;
use panel_layout_core::{
    can_add_panel, ConflictType, DragSession, EngineConfig, LayoutEngine, Panel, PanelId, PanelKind,
    PlacementError, PlacementPolicy, Point, Rect, ResizeConstraints, Size, ZIndexLayer, ZIndexManager,
};

fn panel(id: &str, x: f64, y: f64, w: f64, h: f64) -> Panel {
    Panel::new(id, Point::new(x, y), Size::new(w, h))
}

#[test]
fn overlapping_panels_intersect() {
    let a = panel("a", 0.0, 0.0, 100.0, 100.0).rect();
    let b = panel("b", 50.0, 50.0, 100.0, 100.0).rect();
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
    assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));
}

#[test]
fn snapping_within_threshold() {
    assert_eq!(snap_to_grid(Point::new(12.0, 18.0), 20.0, 10.0), Point::new(20.0, 20.0));
}

#[test]
fn snapping_is_per_axis() {
    assert_eq!(snap_to_grid(Point::new(12.0, 3.0), 20.0, 5.0), Point::new(12.0, 0.0));
}

#[test]
fn duplicate_z_indices_are_rearranged() {
    let mut manager = ZIndexManager::default();
    let panels = vec![
        panel("first", 0.0, 0.0, 10.0, 10.0).with_z_index(2000),
        panel("second", 0.0, 0.0, 10.0, 10.0).with_z_index(2000),
    ];

    let conflicts = manager.detect_conflicts(&panels);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::Duplicate);
    assert_eq!(conflicts[0].panel_ids, vec![PanelId::from("first"), PanelId::from("second")]);

    let arranged = manager.auto_arrange(&panels);
    assert_eq!(arranged[1].z_index - arranged[0].z_index, DEFAULT_SPACING);
    assert!(arranged[0].z_index < arranged[1].z_index);
}

#[test]
fn undersized_resize_is_clamped() {
    let p = panel("p", 0.0, 0.0, 300.0, 300.0);
    let constraints = ResizeConstraints { min_size: Size::new(100.0, 100.0), ..Default::default() };
    let result = validate_resize_operation(&p, Size::new(50.0, 50.0), &constraints, &[]);

    assert_eq!(result.constrained_size, Size::new(100.0, 100.0));
    assert!(!result.is_valid);
    let kinds: Vec<ViolationKind> = result.violations.iter().map(|v| v.kind).collect();
    assert_eq!(kinds, vec![ViolationKind::MinWidth, ViolationKind::MinHeight]);
}

#[test]
fn add_place_and_drag_a_panel() {
    let mut store = vec![panel("chart", 0.0, 0.0, 200.0, 200.0).with_z_index(2010).with_kind(PanelKind::Chart)];
    let mut engine = LayoutEngine::with_panels(EngineConfig::default(), &store);

    // Place a settings panel in the first free spot.
    let bounds = Rect::new(0.0, 0.0, 800.0, 600.0);
    let size = Size::new(200.0, 150.0);
    let spot = find_first_free_position(size, &store, &bounds, 20.0).unwrap();
    let settings = panel("settings", spot.x, spot.y, size.width, size.height)
        .with_kind(PanelKind::Settings)
        .with_z_index(initial_z_index(&store, DEFAULT_SPACING));
    assert!(can_add_panel(&settings, &store));
    assert_eq!(settings.z_index, 2020);

    let policy = PlacementPolicy::default().with_singleton(PanelKind::Settings);
    assert!(policy.admit(&settings, &store).is_ok());
    engine.insert_panel(&settings);
    store.push(settings);

    let another = panel("settings-2", 600.0, 400.0, 100.0, 100.0).with_kind(PanelKind::Settings);
    assert_eq!(policy.admit(&another, &store), Err(PlacementError::SingletonExists(PanelKind::Settings)));

    // Drag the settings panel onto the chart; the commit lands somewhere free.
    let mut drag = DragSession::start(&store[1], Point::new(spot.x + 5.0, spot.y + 5.0));
    let preview = drag.update(Point::new(105.0, 105.0), &engine);
    assert!(!preview.is_valid);
    let committed = drag.finish();
    assert!(engine.is_valid_position(committed, size, Some(&PanelId::from("settings")), None));

    store[1].position = committed;
    engine.insert_panel(&store[1]);
    assert_eq!(engine.index().len(), 2);

    let store = engine.bring_to_front(&PanelId::from("chart"), &store, ZIndexLayer::Panel);
    assert!(store[0].z_index > store[1].z_index);
}
