//! Styled rectangular overlays drawn as child surfaces of a host editor.
//!
//! Each box is a small undecorated child surface backed by a blank,
//! read-only content container whose face is overridden to paint a solid
//! background. The host does all rendering through the [`Host`] trait;
//! this crate translates pixel geometry into cells, merges styles and keeps
//! track of the boxes each editing context owns.
//!
//! ```
//! use cellbox::{BoxController, CellMetrics, MemoryHost, StyleOverride};
//!
//! let mut boxes = BoxController::new(MemoryHost::new(CellMetrics::new(10, 20)));
//! let marker = boxes.create(40, 80, 100, 100, None)?;
//! boxes.set_style(marker, &StyleOverride::new().opacity(50))?;
//! boxes.move_to(marker, 0, 0)?;
//! boxes.delete(marker)?;
//! boxes.delete(marker)?; // already gone: no-op
//! # Ok::<(), cellbox::BoxError>(())
//! ```

pub mod controller;
pub mod error;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod style;
pub mod surface;

pub use controller::{BoxController, ControllerConfig, UnknownKeyPolicy};
pub use error::{BoxError, Result};
pub use geometry::{CellMetrics, CellSize, Position, pixels_to_cells};
pub use host::{
    ContentId, ContentSettings, FaceOverride, Host, HostCall, MemoryHost, SurfaceDelta, SurfaceId,
    SurfaceParams, TerminalHost,
};
pub use logging::{LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult};
pub use metrics::{BoxMetrics, MetricSnapshot};
pub use registry::{BoxHandle, BoxRegistry};
pub use style::{StyleOverride, StyleRecord, merge};
pub use surface::{FillSettings, HostSurfaceAdapter};
