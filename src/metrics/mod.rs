use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Lifecycle counters for one controller.
#[derive(Debug, Default, Clone)]
pub struct BoxMetrics {
    created: u64,
    deleted: u64,
    moved: u64,
    resized: u64,
    restyled: u64,
    dead_handle_noops: u64,
    host_failures: u64,
}

impl BoxMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created(&mut self) {
        self.created = self.created.saturating_add(1);
    }

    pub fn record_deleted(&mut self) {
        self.deleted = self.deleted.saturating_add(1);
    }

    pub fn record_moved(&mut self) {
        self.moved = self.moved.saturating_add(1);
    }

    pub fn record_resized(&mut self) {
        self.resized = self.resized.saturating_add(1);
    }

    pub fn record_restyled(&mut self) {
        self.restyled = self.restyled.saturating_add(1);
    }

    pub fn record_dead_handle(&mut self) {
        self.dead_handle_noops = self.dead_handle_noops.saturating_add(1);
    }

    pub fn record_host_failure(&mut self) {
        self.host_failures = self.host_failures.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            created: self.created,
            deleted: self.deleted,
            moved: self.moved,
            resized: self.resized,
            restyled: self.restyled,
            dead_handle_noops: self.dead_handle_noops,
            host_failures: self.host_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub created: u64,
    pub deleted: u64,
    pub moved: u64,
    pub resized: u64,
    pub restyled: u64,
    pub dead_handle_noops: u64,
    pub host_failures: u64,
}

impl MetricSnapshot {
    /// Boxes created but not yet deleted through the controller.
    pub fn outstanding(&self) -> u64 {
        self.created.saturating_sub(self.deleted)
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "box_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("created".to_string(), json!(self.created));
        map.insert("deleted".to_string(), json!(self.deleted));
        map.insert("moved".to_string(), json!(self.moved));
        map.insert("resized".to_string(), json!(self.resized));
        map.insert("restyled".to_string(), json!(self.restyled));
        map.insert(
            "dead_handle_noops".to_string(),
            json!(self.dead_handle_noops),
        );
        map.insert("host_failures".to_string(), json!(self.host_failures));
        map
    }
}
