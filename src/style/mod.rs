//! Box style records and color helpers.
//!
//! A [`StyleRecord`] is always complete; callers describe changes with a
//! [`StyleOverride`] and [`merge`] it over a base record.

mod color;
mod core;

pub use color::parse_color;
pub use core::{
    DEFAULT_BACKGROUND, DEFAULT_BORDER_COLOR, DEFAULT_BORDER_WIDTH, DEFAULT_FOREGROUND,
    DEFAULT_OPACITY, StyleOverride, StyleRecord, merge,
};
