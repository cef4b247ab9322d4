use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::error::{BoxError, Result};
use crate::logging::Logger;
use crate::metrics::BoxMetrics;
use crate::style::StyleRecord;
use crate::surface::FillSettings;

/// What to do with style keys that are not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    Ignore,
    #[default]
    Warn,
    Reject,
}

/// Configuration knobs for a [`super::BoxController`].
#[derive(Clone)]
pub struct ControllerConfig {
    /// Style every caller override is merged over.
    pub default_style: StyleRecord,
    /// Blank fill written into each backing content container.
    pub fill: FillSettings,
    pub unknown_keys: UnknownKeyPolicy,
    /// Prefix of content container names; a counter and `*` are appended.
    pub content_name_prefix: String,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Lifecycle counters. `None` disables collection.
    pub metrics: Option<Arc<Mutex<BoxMetrics>>>,
    /// Target field used when emitting metrics snapshots.
    pub metrics_target: String,
}

impl fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("default_style", &self.default_style)
            .field("fill", &self.fill)
            .field("unknown_keys", &self.unknown_keys)
            .field("content_name_prefix", &self.content_name_prefix)
            .field("logger", &self.logger.is_some())
            .field("metrics", &self.metrics.is_some())
            .field("metrics_target", &self.metrics_target)
            .finish()
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_style: StyleRecord::default(),
            fill: FillSettings::default(),
            unknown_keys: UnknownKeyPolicy::default(),
            content_name_prefix: " *cellbox".to_string(),
            logger: None,
            metrics: None,
            metrics_target: "cellbox::metrics".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    default_style: StyleRecord,
    fill: FillSettings,
    unknown_keys: UnknownKeyPolicy,
    content_name_prefix: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let config = ControllerConfig::default();
        Self {
            default_style: config.default_style,
            fill: config.fill,
            unknown_keys: config.unknown_keys,
            content_name_prefix: config.content_name_prefix,
        }
    }
}

impl ControllerConfig {
    /// Build a config from JSON such as
    /// `{"default_style": {"opacity": 80}, "unknown_keys": "reject"}`.
    /// Omitted fields keep their defaults; logger and metrics stay unset.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(source).map_err(|err| BoxError::Config(err.to_string()))?;
        Ok(Self {
            default_style: file.default_style,
            fill: file.fill,
            unknown_keys: file.unknown_keys,
            content_name_prefix: file.content_name_prefix,
            ..Self::default()
        })
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(BoxMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<BoxMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}
