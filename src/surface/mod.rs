//! Host-facing layer: turns assembled parameters into host calls.

mod core;

pub use core::{FillSettings, HostSurfaceAdapter};
