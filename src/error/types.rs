use thiserror::Error;

/// Unified result type for the cellbox crate.
pub type Result<T> = std::result::Result<T, BoxError>;

/// Errors surfaced by box construction and host calls.
///
/// Operations on dead or foreign handles never produce an error; they are
/// dropped as no-ops by the controller.
#[derive(Debug, Error)]
pub enum BoxError {
    #[error("invalid geometry {width_px}x{height_px}px: {reason}")]
    InvalidGeometry {
        width_px: i32,
        height_px: i32,
        reason: String,
    },
    #[error("host unavailable: {0}")]
    HostUnavailable(String),
    #[error("unknown style key `{0}`")]
    UnknownStyleKey(String),
    #[error("invalid style: {0}")]
    InvalidStyle(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("host call failed: {0}")]
    Host(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BoxError {
    pub(crate) fn geometry(width_px: i32, height_px: i32, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            width_px,
            height_px,
            reason: reason.into(),
        }
    }
}
