use crate::error::{BoxError, Result};

/// Pixel size of one character cell as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    pub width_px: u32,
    pub height_px: u32,
}

impl CellMetrics {
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }
}

/// Integer size measured in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSize {
    pub cols: u16,
    pub rows: u16,
}

impl CellSize {
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

/// Pixel position relative to the parent surface's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Convert a pixel extent into whole cells, truncating toward zero.
///
/// Non-positive pixel sizes and extents smaller than a single cell are
/// rejected with [`BoxError::InvalidGeometry`]; a zero cell metric means the
/// host cannot be measured and yields [`BoxError::HostUnavailable`]. Callers
/// must query fresh metrics for every call since a font change alters them.
pub fn pixels_to_cells(width_px: i32, height_px: i32, metrics: CellMetrics) -> Result<CellSize> {
    if metrics.width_px == 0 || metrics.height_px == 0 {
        return Err(BoxError::HostUnavailable(format!(
            "host reported a {}x{}px character cell",
            metrics.width_px, metrics.height_px
        )));
    }
    if width_px <= 0 || height_px <= 0 {
        return Err(BoxError::geometry(
            width_px,
            height_px,
            "width and height must be positive",
        ));
    }

    let cols = width_px as u32 / metrics.width_px;
    let rows = height_px as u32 / metrics.height_px;
    if cols == 0 || rows == 0 {
        return Err(BoxError::geometry(
            width_px,
            height_px,
            format!(
                "smaller than one {}x{}px cell",
                metrics.width_px, metrics.height_px
            ),
        ));
    }

    Ok(CellSize::new(
        cols.min(u16::MAX as u32) as u16,
        rows.min(u16::MAX as u32) as u16,
    ))
}
