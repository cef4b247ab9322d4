//! Per-context bookkeeping of live box handles.
//!
//! The registry only remembers which handles a controller created; the host
//! owns the surfaces themselves.

mod core;

pub use core::{BoxHandle, BoxRegistry};
