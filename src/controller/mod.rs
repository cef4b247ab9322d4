//! Public box API.
//!
//! A [`BoxController`] belongs to one editing context. It creates boxes on
//! the host, tracks them in its own [`BoxRegistry`] and deletes whatever is
//! left when it is dropped.
//!
//! Lifecycle per box is `created -> live -> deleted`. Every operation other
//! than [`BoxController::create`] first checks that the handle is tracked
//! here and still alive on the host; otherwise it returns `Ok(())` without
//! touching the host.

use serde_json::json;

use crate::error::{BoxError, Result};
use crate::geometry::{Position, pixels_to_cells};
use crate::host::{Host, SurfaceDelta, SurfaceParams};
use crate::logging::{LogLevel, event_with_fields, json_kv, json_str};
use crate::metrics::{BoxMetrics, MetricSnapshot};
use crate::registry::{BoxHandle, BoxRegistry};
use crate::style::{StyleOverride, StyleRecord};
use crate::surface::HostSurfaceAdapter;

mod config;

pub use config::{ControllerConfig, UnknownKeyPolicy};

const LOG_TARGET: &str = "cellbox::controller";

pub struct BoxController<H: Host> {
    adapter: HostSurfaceAdapter<H>,
    registry: BoxRegistry,
    config: ControllerConfig,
}

impl<H: Host> BoxController<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, ControllerConfig::default())
    }

    pub fn with_config(host: H, config: ControllerConfig) -> Self {
        let adapter = HostSurfaceAdapter::new(
            host,
            config.fill.clone(),
            config.content_name_prefix.clone(),
        );
        Self {
            adapter,
            registry: BoxRegistry::new(),
            config,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        self.adapter.host()
    }

    /// Create a box at pixel position `(x, y)` sized `width_px` by
    /// `height_px`, styled with `style` merged over the default style.
    pub fn create(
        &mut self,
        x: i32,
        y: i32,
        width_px: i32,
        height_px: i32,
        style: Option<&StyleOverride>,
    ) -> Result<BoxHandle> {
        let style = self.resolve_style(style)?;
        let metrics = self.adapter.host().cell_metrics()?;
        let size = pixels_to_cells(width_px, height_px, metrics)?;
        let parent = self.adapter.host().selected_surface()?;

        let params = SurfaceParams::child_box(parent, Position::new(x, y), size, &style);
        let handle = match self.adapter.create(&params, &style) {
            Ok(handle) => handle,
            Err(err) => {
                self.record(BoxMetrics::record_host_failure);
                return Err(err);
            }
        };

        if !self.registry.add(handle) {
            let _ = self.adapter.destroy(handle);
            self.record(BoxMetrics::record_host_failure);
            return Err(BoxError::Host(format!("host returned tracked {handle}")));
        }
        if size.cols > self.config.fill.columns || size.rows > self.config.fill.rows {
            self.log(
                LogLevel::Warn,
                "fill_too_small",
                [
                    json_str("handle", handle.to_string()),
                    json_kv("cols", size.cols),
                    json_kv("rows", size.rows),
                    json_kv("fill_columns", self.config.fill.columns),
                    json_kv("fill_rows", self.config.fill.rows),
                ],
            );
        }
        self.record(BoxMetrics::record_created);
        self.log(
            LogLevel::Debug,
            "box_created",
            [
                json_str("handle", handle.to_string()),
                json_kv("cols", size.cols),
                json_kv("rows", size.rows),
                json_kv("x", x),
                json_kv("y", y),
            ],
        );
        Ok(handle)
    }

    /// Move a box to pixel position `(x, y)`. Size and style are untouched.
    pub fn move_to(&mut self, handle: BoxHandle, x: i32, y: i32) -> Result<()> {
        if !self.tracks_live(handle, "move") {
            return Ok(());
        }
        let delta = SurfaceDelta::position(Position::new(x, y));
        self.host_call(|adapter| adapter.update(handle, &delta))?;
        self.record(BoxMetrics::record_moved);
        Ok(())
    }

    /// Resize a box, converting pixels with the host's current cell metrics.
    pub fn resize(&mut self, handle: BoxHandle, width_px: i32, height_px: i32) -> Result<()> {
        if !self.tracks_live(handle, "resize") {
            return Ok(());
        }
        let metrics = self.adapter.host().cell_metrics()?;
        let size = pixels_to_cells(width_px, height_px, metrics)?;
        self.host_call(|adapter| adapter.update(handle, &SurfaceDelta::size(size)))?;
        self.record(BoxMetrics::record_resized);
        Ok(())
    }

    /// Replace a box's style with `style` merged over the default style.
    ///
    /// Surface parameters are updated first, then the fill face. The two
    /// calls are not atomic: if the second fails the first stays applied.
    pub fn set_style(&mut self, handle: BoxHandle, style: &StyleOverride) -> Result<()> {
        if !self.tracks_live(handle, "set_style") {
            return Ok(());
        }
        let style = self.resolve_style(Some(style))?;
        self.host_call(|adapter| adapter.update(handle, &SurfaceDelta::style(&style)))?;
        self.host_call(|adapter| adapter.set_content_style(handle, &style))?;
        self.record(BoxMetrics::record_restyled);
        Ok(())
    }

    /// Delete a box. Deleting twice, or deleting a handle this controller
    /// does not track, does nothing.
    pub fn delete(&mut self, handle: BoxHandle) -> Result<()> {
        if !self.registry.contains(handle) {
            self.note_dead_handle(handle, "delete");
            return Ok(());
        }
        self.host_call(|adapter| adapter.destroy(handle))?;
        self.registry.remove(handle);
        self.record(BoxMetrics::record_deleted);
        self.log(
            LogLevel::Debug,
            "box_deleted",
            [json_str("handle", handle.to_string())],
        );
        Ok(())
    }

    /// Delete every tracked box and empty the registry. Host failures are
    /// logged and skipped so one stuck box never blocks the rest. Returns the
    /// number of boxes released without error.
    pub fn delete_all(&mut self) -> usize {
        let handles = self.registry.all().to_vec();
        let mut released = 0;
        for handle in handles {
            match self.adapter.destroy(handle) {
                Ok(_) => {
                    released += 1;
                    self.record(BoxMetrics::record_deleted);
                }
                Err(err) => {
                    self.record(BoxMetrics::record_host_failure);
                    self.log(
                        LogLevel::Warn,
                        "delete_failed",
                        [
                            json_str("handle", handle.to_string()),
                            json_str("error", err.to_string()),
                        ],
                    );
                }
            }
        }
        self.registry.clear();
        released
    }

    pub fn handles(&self) -> &[BoxHandle] {
        self.registry.all()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn contains(&self, handle: BoxHandle) -> bool {
        self.registry.contains(handle)
    }

    /// Tracked here and still alive on the host.
    pub fn is_live(&self, handle: BoxHandle) -> bool {
        self.registry.contains(handle) && self.adapter.is_alive(handle)
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        self.config
            .metrics
            .as_ref()
            .and_then(|metrics| metrics.lock().ok().map(|guard| guard.snapshot()))
    }

    /// Log the current metrics snapshot, if both logger and metrics are set.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) =
            (self.config.logger.as_ref(), self.metrics_snapshot())
        {
            let event = snapshot.to_log_event(&self.config.metrics_target);
            let _ = logger.log_event(event);
        }
    }

    fn resolve_style(&self, style: Option<&StyleOverride>) -> Result<StyleRecord> {
        let Some(style) = style else {
            return Ok(self.config.default_style.clone());
        };

        let unknown = style.unknown_keys();
        if !unknown.is_empty() {
            match self.config.unknown_keys {
                UnknownKeyPolicy::Ignore => {}
                UnknownKeyPolicy::Warn => self.log(
                    LogLevel::Warn,
                    "unknown_style_keys",
                    [json_kv("keys", json!(unknown))],
                ),
                UnknownKeyPolicy::Reject => {
                    return Err(BoxError::UnknownStyleKey(unknown.join(", ")));
                }
            }
        }
        Ok(self.config.default_style.merged(style))
    }

    fn tracks_live(&self, handle: BoxHandle, op: &str) -> bool {
        if self.is_live(handle) {
            return true;
        }
        self.note_dead_handle(handle, op);
        false
    }

    fn note_dead_handle(&self, handle: BoxHandle, op: &str) {
        self.record(BoxMetrics::record_dead_handle);
        self.log(
            LogLevel::Trace,
            "box_dead_handle",
            [json_str("handle", handle.to_string()), json_str("op", op)],
        );
    }

    fn host_call<T>(
        &mut self,
        call: impl FnOnce(&mut HostSurfaceAdapter<H>) -> Result<T>,
    ) -> Result<T> {
        let outcome = call(&mut self.adapter);
        if outcome.is_err() {
            self.record(BoxMetrics::record_host_failure);
        }
        outcome
    }

    fn record(&self, update: impl FnOnce(&mut BoxMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut *guard);
            }
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            let event = event_with_fields(level, LOG_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

impl<H: Host> Drop for BoxController<H> {
    fn drop(&mut self) {
        self.delete_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{CellMetrics, CellSize};
    use crate::host::{HostCall, MemoryHost};
    use crate::logging::{Logger, MemorySink};
    use serde_json::json;
    use std::rc::Rc;

    fn controller() -> BoxController<MemoryHost> {
        let mut config = ControllerConfig::default();
        config.fill.columns = 16;
        config.fill.rows = 4;
        config.enable_metrics();
        BoxController::with_config(MemoryHost::new(CellMetrics::new(10, 20)), config)
    }

    #[test]
    fn create_converts_pixels_to_cells() {
        let mut boxes = controller();
        let handle = boxes.create(0, 0, 100, 100, None).unwrap();
        let params = boxes.host().surface(handle.surface()).unwrap();
        assert_eq!(params.size(), CellSize::new(10, 5));
        assert_eq!(boxes.handles(), &[handle]);
    }

    #[test]
    fn create_rejects_bad_geometry_without_host_calls() {
        let mut boxes = controller();
        let err = boxes.create(0, 0, 0, 100, None).unwrap_err();
        assert!(matches!(err, BoxError::InvalidGeometry { .. }));
        let err = boxes.create(0, 0, 5, 100, None).unwrap_err();
        assert!(matches!(err, BoxError::InvalidGeometry { .. }));
        assert!(boxes.host().calls().is_empty());
        assert!(boxes.is_empty());
    }

    #[test]
    fn create_surfaces_missing_metrics() {
        let mut boxes = controller();
        boxes.host().set_cell_metrics(None);
        let err = boxes.create(0, 0, 100, 100, None).unwrap_err();
        assert!(matches!(err, BoxError::HostUnavailable(_)));
    }

    #[test]
    fn move_and_resize_keep_style() {
        let mut boxes = controller();
        let style = StyleOverride::new()
            .background_color("navy")
            .border_color("gold")
            .border_width(2)
            .opacity(70);
        let handle = boxes.create(0, 0, 100, 100, Some(&style)).unwrap();
        let before = boxes.host().surface(handle.surface()).unwrap();

        boxes.move_to(handle, 40, 60).unwrap();
        boxes.resize(handle, 200, 40).unwrap();

        let after = boxes.host().surface(handle.surface()).unwrap();
        assert_eq!(after.position(), Position::new(40, 60));
        assert_eq!(after.size(), CellSize::new(20, 2));
        assert_eq!(after.border_width, before.border_width);
        assert_eq!(after.border_color, before.border_color);
        assert_eq!(after.opacity, before.opacity);
        assert_eq!(after.background_color, before.background_color);
    }

    #[test]
    fn resize_uses_current_metrics() {
        let mut boxes = controller();
        let handle = boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.host().set_cell_metrics(Some(CellMetrics::new(5, 10)));
        boxes.resize(handle, 100, 100).unwrap();
        let params = boxes.host().surface(handle.surface()).unwrap();
        assert_eq!(params.size(), CellSize::new(20, 10));
    }

    #[test]
    fn set_style_reissues_face_each_time() {
        let mut boxes = controller();
        let handle = boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.host().clear_calls();

        let style = StyleOverride::new().background_color("#102030").opacity(50);
        boxes.set_style(handle, &style).unwrap();
        boxes.set_style(handle, &style).unwrap();

        let calls = boxes.host().calls();
        let faces = calls
            .iter()
            .filter(|call| matches!(call, HostCall::SetFaceOverride(..)))
            .count();
        assert_eq!(faces, 2);

        let content = boxes.host().attached_content(handle.surface()).unwrap();
        let face = boxes.host().content(content).unwrap().face.unwrap();
        assert_eq!(face.background, "#102030");
        let params = boxes.host().surface(handle.surface()).unwrap();
        assert_eq!(params.opacity, 50);
        assert_eq!(params.background_color, "#102030");
    }

    #[test]
    fn dead_handle_operations_are_noops() {
        let mut boxes = controller();
        let handle = boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.delete(handle).unwrap();
        boxes.host().clear_calls();

        boxes.move_to(handle, 1, 1).unwrap();
        boxes.resize(handle, -5, 0).unwrap();
        boxes.set_style(handle, &StyleOverride::new().opacity(1)).unwrap();
        boxes.delete(handle).unwrap();

        assert!(boxes.host().calls().is_empty());
        let snapshot = boxes.metrics_snapshot().unwrap();
        assert_eq!(snapshot.dead_handle_noops, 4);
        assert_eq!(snapshot.deleted, 1);
    }

    #[test]
    fn externally_closed_box_is_skipped_by_delete_all() {
        let mut boxes = controller();
        let first = boxes.create(0, 0, 100, 100, None).unwrap();
        let second = boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.host().close_externally(first.surface());

        boxes.move_to(first, 3, 3).unwrap();
        assert_eq!(boxes.delete_all(), 2);
        assert!(boxes.is_empty());
        assert!(!boxes.host().is_surface_live(second.surface()));
        assert_eq!(boxes.host().content_count(), 0);
    }

    #[test]
    fn delete_all_continues_past_host_failures() {
        let mut boxes = controller();
        boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.host().set_fail_deletes(true);

        assert_eq!(boxes.delete_all(), 0);
        assert!(boxes.is_empty());
        assert_eq!(boxes.metrics_snapshot().unwrap().host_failures, 2);
        boxes.host().set_fail_deletes(false);
    }

    #[test]
    fn recycled_surface_ids_stay_tracked() {
        let mut boxes = controller();
        boxes.host().set_recycle_surface_ids(true);
        let first = boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.delete(first).unwrap();
        let second = boxes.create(0, 0, 100, 100, None).unwrap();

        assert_eq!(first.surface(), second.surface());
        assert!(boxes.contains(second));
        assert!(!boxes.contains(first));

        boxes.move_to(first, 7, 7).unwrap();
        assert_eq!(boxes.host().surface(second.surface()).unwrap().left, 0);
        boxes.move_to(second, 7, 7).unwrap();
        assert_eq!(boxes.host().surface(second.surface()).unwrap().left, 7);

        assert_eq!(boxes.delete_all(), 1);
        assert!(boxes.host().live_surfaces().is_empty());
        assert_eq!(boxes.host().content_count(), 0);
    }

    #[test]
    fn box_larger_than_fill_is_reported() {
        let sink = MemorySink::new();
        let mut config = ControllerConfig::default().with_logger(Logger::new(sink.clone()));
        config.fill.columns = 4;
        config.fill.rows = 4;
        let mut boxes =
            BoxController::with_config(MemoryHost::new(CellMetrics::new(10, 20)), config);

        boxes.create(0, 0, 40, 80, None).unwrap();
        assert!(!sink.messages().contains(&"fill_too_small".to_string()));

        boxes.create(0, 0, 100, 40, None).unwrap();
        let warning = sink
            .events()
            .into_iter()
            .find(|event| event.message == "fill_too_small")
            .unwrap();
        assert_eq!(warning.level, LogLevel::Warn);
        assert_eq!(warning.fields.get("cols"), Some(&json!(10)));
        assert_eq!(warning.fields.get("fill_columns"), Some(&json!(4)));
    }

    #[test]
    fn unknown_keys_follow_policy() {
        let sink = MemorySink::new();
        let mut config = ControllerConfig::default().with_logger(Logger::new(sink.clone()));
        config.fill.columns = 1;
        config.fill.rows = 1;
        let mut boxes =
            BoxController::with_config(MemoryHost::new(CellMetrics::new(10, 20)), config);

        let style = StyleOverride::from_json(&json!({"opacity": 30, "glow": 4})).unwrap();
        let handle = boxes.create(0, 0, 50, 50, Some(&style)).unwrap();
        assert_eq!(boxes.host().surface(handle.surface()).unwrap().opacity, 30);
        assert!(sink.messages().contains(&"unknown_style_keys".to_string()));

        boxes.config.unknown_keys = UnknownKeyPolicy::Reject;
        let err = boxes.create(0, 0, 50, 50, Some(&style)).unwrap_err();
        assert!(matches!(err, BoxError::UnknownStyleKey(ref keys) if keys == "glow"));
        let err = boxes.set_style(handle, &style).unwrap_err();
        assert!(matches!(err, BoxError::UnknownStyleKey(_)));
    }

    #[test]
    fn controllers_do_not_share_handles() {
        let host = Rc::new(MemoryHost::new(CellMetrics::new(10, 20)));
        let mut left = BoxController::new(Rc::clone(&host));
        let mut right = BoxController::new(Rc::clone(&host));

        let handle = left.create(0, 0, 100, 100, None).unwrap();
        right.delete(handle).unwrap();
        right.move_to(handle, 9, 9).unwrap();
        assert!(host.is_surface_live(handle.surface()));
        assert_eq!(host.surface(handle.surface()).unwrap().left, 0);

        drop(left);
        assert!(!host.is_surface_live(handle.surface()));
        assert!(right.is_empty());
    }

    #[test]
    fn lifecycle_is_logged() {
        let sink = MemorySink::new();
        let mut config = ControllerConfig::default().with_logger(Logger::new(sink.clone()));
        config.enable_metrics();
        let mut boxes =
            BoxController::with_config(MemoryHost::new(CellMetrics::new(10, 20)), config);
        let handle = boxes.create(0, 0, 100, 100, None).unwrap();
        boxes.delete(handle).unwrap();
        boxes.emit_metrics();

        let messages = sink.messages();
        assert_eq!(
            messages,
            vec![
                "box_created".to_string(),
                "box_deleted".to_string(),
                "box_metrics".to_string()
            ]
        );
        let created = &sink.events()[0];
        assert_eq!(created.fields.get("cols"), Some(&json!(10)));
    }
}
