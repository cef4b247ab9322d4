use std::rc::Rc;

use cellbox::{
    BoxController, BoxError, CellMetrics, CellSize, ControllerConfig, HostCall, MemoryHost,
    StyleOverride, StyleRecord, merge, pixels_to_cells,
};

fn small_fill() -> ControllerConfig {
    let mut config = ControllerConfig::default();
    config.fill.columns = 8;
    config.fill.rows = 2;
    config
}

fn controller() -> BoxController<Rc<MemoryHost>> {
    let host = Rc::new(MemoryHost::new(CellMetrics::new(10, 20)));
    BoxController::with_config(host, small_fill())
}

#[test]
fn hundred_pixel_box_on_ten_by_twenty_cells() {
    let mut boxes = controller();
    let handle = boxes.create(5, 5, 100, 100, None).unwrap();
    let params = boxes.host().surface(handle.surface()).unwrap();
    assert_eq!(params.size(), CellSize::new(10, 5));
}

#[test]
fn conversion_never_rounds_up() {
    for cell_w in 1..12u32 {
        for w in [1i32, 7, 33, 100, 257] {
            let metrics = CellMetrics::new(cell_w, 16);
            match pixels_to_cells(w, 64, metrics) {
                Ok(size) => assert!(size.cols as i64 * cell_w as i64 <= w as i64),
                Err(err) => {
                    assert!(matches!(err, BoxError::InvalidGeometry { .. }));
                    assert!((w as u32) < cell_w);
                }
            }
        }
    }
}

#[test]
fn double_delete_is_quiet() {
    let mut boxes = controller();
    let handle = boxes.create(0, 0, 100, 100, None).unwrap();
    boxes.delete(handle).unwrap();
    boxes.host().clear_calls();
    boxes.delete(handle).unwrap();
    assert!(boxes.host().calls().is_empty());
}

#[test]
fn delete_all_on_empty_registry() {
    let mut boxes = controller();
    assert_eq!(boxes.delete_all(), 0);
    assert!(boxes.host().calls().is_empty());
}

#[test]
fn merging_opacity_only() {
    let defaults = StyleRecord::default();
    let merged = merge(&defaults, &StyleOverride::new().opacity(50));
    assert_eq!(merged.opacity(), 50);
    assert_eq!(
        merged.merged(&StyleOverride::new().opacity(defaults.opacity() as i64)),
        defaults
    );
}

#[test]
fn deleted_box_is_not_touched_by_delete_all() {
    let mut boxes = controller();
    let kept = boxes.create(0, 0, 100, 100, None).unwrap();
    let gone = boxes.create(0, 0, 100, 100, None).unwrap();
    boxes.delete(gone).unwrap();
    boxes.host().clear_calls();

    assert_eq!(boxes.delete_all(), 1);
    let deletes: Vec<_> = boxes
        .host()
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            HostCall::DeleteSurface(id) => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(deletes, vec![kept.surface()]);
}

#[test]
fn repeated_restyle_replaces_face() {
    let mut boxes = controller();
    let handle = boxes.create(0, 0, 100, 100, None).unwrap();
    let style = StyleOverride::new().background_color("#224466");
    boxes.set_style(handle, &style).unwrap();
    boxes.set_style(handle, &style).unwrap();

    let content = boxes.host().attached_content(handle.surface()).unwrap();
    let face = boxes.host().content(content).unwrap().face.unwrap();
    assert_eq!(face.background, "#224466");
    assert!(face.extend);
}

#[test]
fn dropping_controller_tears_down_context() {
    let host = Rc::new(MemoryHost::new(CellMetrics::new(10, 20)));
    {
        let mut boxes = BoxController::with_config(Rc::clone(&host), small_fill());
        boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.create(50, 50, 30, 40, None).unwrap();
        assert_eq!(host.live_surfaces().len(), 2);
    }
    assert!(host.live_surfaces().is_empty());
    assert_eq!(host.content_count(), 0);
}

#[test]
fn recycled_surface_id_is_released_by_delete_all() {
    let host = Rc::new(MemoryHost::new(CellMetrics::new(10, 20)));
    host.set_recycle_surface_ids(true);
    let mut boxes = BoxController::with_config(Rc::clone(&host), small_fill());

    let first = boxes.create(0, 0, 50, 40, None).unwrap();
    boxes.delete(first).unwrap();
    let second = boxes.create(0, 0, 50, 40, None).unwrap();
    assert_eq!(first.surface(), second.surface());
    assert_ne!(first, second);
    assert!(boxes.contains(second));

    assert_eq!(boxes.delete_all(), 1);
    assert!(host.live_surfaces().is_empty());
    assert_eq!(host.content_count(), 0);
}
