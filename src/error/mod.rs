mod types;

pub use types::{BoxError, Result};
