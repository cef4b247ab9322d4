use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BoxError, Result};

pub const DEFAULT_BACKGROUND: &str = "#333333";
pub const DEFAULT_FOREGROUND: &str = "white";
pub const DEFAULT_BORDER_COLOR: &str = "black";
pub const DEFAULT_BORDER_WIDTH: u16 = 1;
pub const DEFAULT_OPACITY: u8 = 100;

/// Fully resolved box style. Never mutated after construction; restyling a
/// box replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStyleRecord")]
pub struct StyleRecord {
    background_color: String,
    foreground_color: String,
    border_color: String,
    border_width: u16,
    opacity: u8,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            foreground_color: DEFAULT_FOREGROUND.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
            border_width: DEFAULT_BORDER_WIDTH,
            opacity: DEFAULT_OPACITY,
        }
    }
}

/// Wire form of [`StyleRecord`]. Numbers are read wide and clamped on the
/// way in, exactly as [`merge`] clamps overrides.
#[derive(Deserialize)]
#[serde(default)]
struct RawStyleRecord {
    background_color: String,
    foreground_color: String,
    border_color: String,
    border_width: i64,
    opacity: i64,
}

impl Default for RawStyleRecord {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND.to_string(),
            foreground_color: DEFAULT_FOREGROUND.to_string(),
            border_color: DEFAULT_BORDER_COLOR.to_string(),
            border_width: i64::from(DEFAULT_BORDER_WIDTH),
            opacity: i64::from(DEFAULT_OPACITY),
        }
    }
}

impl From<RawStyleRecord> for StyleRecord {
    fn from(raw: RawStyleRecord) -> Self {
        Self {
            background_color: raw.background_color,
            foreground_color: raw.foreground_color,
            border_color: raw.border_color,
            border_width: clamp_border_width(raw.border_width),
            opacity: clamp_opacity(raw.opacity),
        }
    }
}

fn clamp_border_width(width: i64) -> u16 {
    width.clamp(0, i64::from(u16::MAX)) as u16
}

fn clamp_opacity(opacity: i64) -> u8 {
    opacity.clamp(0, 100) as u8
}

impl StyleRecord {
    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    pub fn foreground_color(&self) -> &str {
        &self.foreground_color
    }

    pub fn border_color(&self) -> &str {
        &self.border_color
    }

    pub fn border_width(&self) -> u16 {
        self.border_width
    }

    /// Opacity percentage, always within `0..=100`.
    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Returns a new record with `overrides` layered on top of `self`.
    pub fn merged(&self, overrides: &StyleOverride) -> StyleRecord {
        merge(self, overrides)
    }
}

/// Partial style supplied by a caller. Unset fields fall through to the base
/// record during [`merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleOverride {
    background_color: Option<String>,
    foreground_color: Option<String>,
    border_color: Option<String>,
    border_width: Option<i64>,
    opacity: Option<i64>,
    unknown_keys: Vec<String>,
}

impl StyleOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    pub fn foreground_color(mut self, color: impl Into<String>) -> Self {
        self.foreground_color = Some(color.into());
        self
    }

    pub fn border_color(mut self, color: impl Into<String>) -> Self {
        self.border_color = Some(color.into());
        self
    }

    pub fn border_width(mut self, width: i64) -> Self {
        self.border_width = Some(width);
        self
    }

    pub fn opacity(mut self, opacity: i64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Parse an override from a JSON object such as `{"opacity": 50}`.
    ///
    /// Unrecognized keys are kept aside (see [`StyleOverride::unknown_keys`])
    /// so the caller decides whether to ignore, warn or reject them.
    pub fn from_json(value: &Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| BoxError::InvalidStyle("style must be a JSON object".to_string()))?;

        let mut style = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "background_color" => style.background_color = Some(string_value(key, value)?),
                "foreground_color" => style.foreground_color = Some(string_value(key, value)?),
                "border_color" => style.border_color = Some(string_value(key, value)?),
                "border_width" => style.border_width = Some(int_value(key, value)?),
                "opacity" => style.opacity = Some(int_value(key, value)?),
                _ => style.unknown_keys.push(key.clone()),
            }
        }
        Ok(style)
    }

    /// Keys present in the source JSON that are not style keys.
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown_keys
    }

    pub fn is_empty(&self) -> bool {
        self.background_color.is_none()
            && self.foreground_color.is_none()
            && self.border_color.is_none()
            && self.border_width.is_none()
            && self.opacity.is_none()
    }
}

fn string_value(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| BoxError::InvalidStyle(format!("`{key}` must be a string")))
}

fn int_value(key: &str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| BoxError::InvalidStyle(format!("`{key}` must be an integer")))
}

/// Layer `overrides` over `base`. Opacity is clamped into `0..=100` and a
/// negative border width becomes zero.
pub fn merge(base: &StyleRecord, overrides: &StyleOverride) -> StyleRecord {
    StyleRecord {
        background_color: overrides
            .background_color
            .clone()
            .unwrap_or_else(|| base.background_color.clone()),
        foreground_color: overrides
            .foreground_color
            .clone()
            .unwrap_or_else(|| base.foreground_color.clone()),
        border_color: overrides
            .border_color
            .clone()
            .unwrap_or_else(|| base.border_color.clone()),
        border_width: overrides
            .border_width
            .map(clamp_border_width)
            .unwrap_or(base.border_width),
        opacity: overrides
            .opacity
            .map(clamp_opacity)
            .unwrap_or(base.opacity),
    }
}
