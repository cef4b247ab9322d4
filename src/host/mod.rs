//! Host collaborator contract.
//!
//! The editor embedding cellbox supplies a [`Host`]: it owns the real child
//! surfaces and content containers and does all rendering. Everything in this
//! module is parameter plumbing; cellbox never inspects host state beyond the
//! liveness and metric queries below.
//!
//! Two hosts ship with the crate: [`MemoryHost`] records calls in memory and
//! [`TerminalHost`] paints boxes onto an ANSI terminal.

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::geometry::{CellMetrics, CellSize, Position};
use crate::style::StyleRecord;

pub mod memory;
pub mod terminal;

pub use memory::{HostCall, MemoryContent, MemoryHost, ROOT_SURFACE};
pub use terminal::TerminalHost;

/// Host identifier of a display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Host identifier of a content container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(pub u64);

/// Complete parameter set for a new child surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceParams {
    pub parent: SurfaceId,
    pub left: i32,
    pub top: i32,
    pub width_cells: u16,
    pub height_cells: u16,
    pub show_minibuffer: bool,
    pub show_vertical_scrollbars: bool,
    pub show_horizontal_scrollbars: bool,
    pub show_menu_bar: bool,
    pub show_tool_bar: bool,
    pub show_tab_bar: bool,
    pub border_width: u16,
    pub border_color: String,
    pub opacity: u8,
    pub keep_aspect_ratio: bool,
    pub borderless: bool,
    pub focusable: bool,
    pub focus_on_map: bool,
    pub always_on_top: bool,
    pub visible: bool,
    pub background_color: String,
}

impl SurfaceParams {
    /// Parameters for an undecorated, non-focusable box stacked above `parent`.
    pub fn child_box(
        parent: SurfaceId,
        position: Position,
        size: CellSize,
        style: &StyleRecord,
    ) -> Self {
        Self {
            parent,
            left: position.x,
            top: position.y,
            width_cells: size.cols,
            height_cells: size.rows,
            show_minibuffer: false,
            show_vertical_scrollbars: false,
            show_horizontal_scrollbars: false,
            show_menu_bar: false,
            show_tool_bar: false,
            show_tab_bar: false,
            border_width: style.border_width(),
            border_color: style.border_color().to_string(),
            opacity: style.opacity(),
            keep_aspect_ratio: true,
            borderless: true,
            focusable: false,
            focus_on_map: false,
            always_on_top: true,
            visible: true,
            background_color: style.background_color().to_string(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.left, self.top)
    }

    pub fn size(&self) -> CellSize {
        CellSize::new(self.width_cells, self.height_cells)
    }
}

/// In-place modification of an existing surface. Only `Some` fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceDelta {
    pub left: Option<i32>,
    pub top: Option<i32>,
    pub width_cells: Option<u16>,
    pub height_cells: Option<u16>,
    pub border_width: Option<u16>,
    pub border_color: Option<String>,
    pub opacity: Option<u8>,
    pub background_color: Option<String>,
}

impl SurfaceDelta {
    pub fn position(position: Position) -> Self {
        Self {
            left: Some(position.x),
            top: Some(position.y),
            ..Self::default()
        }
    }

    pub fn size(size: CellSize) -> Self {
        Self {
            width_cells: Some(size.cols),
            height_cells: Some(size.rows),
            ..Self::default()
        }
    }

    /// Border, opacity and background taken from `style`.
    pub fn style(style: &StyleRecord) -> Self {
        Self {
            border_width: Some(style.border_width()),
            border_color: Some(style.border_color().to_string()),
            opacity: Some(style.opacity()),
            background_color: Some(style.background_color().to_string()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, params: &mut SurfaceParams) {
        if let Some(left) = self.left {
            params.left = left;
        }
        if let Some(top) = self.top {
            params.top = top;
        }
        if let Some(cols) = self.width_cells {
            params.width_cells = cols;
        }
        if let Some(rows) = self.height_cells {
            params.height_cells = rows;
        }
        if let Some(width) = self.border_width {
            params.border_width = width;
        }
        if let Some(color) = &self.border_color {
            params.border_color = color.clone();
        }
        if let Some(opacity) = self.opacity {
            params.opacity = opacity;
        }
        if let Some(color) = &self.background_color {
            params.background_color = color.clone();
        }
    }
}

/// Behaviour of a content container backing a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentSettings {
    pub read_only: bool,
    pub undo_log: bool,
    pub syntax_highlighting: bool,
    pub status_line: bool,
    pub header_line: bool,
    pub cursor: bool,
}

impl ContentSettings {
    /// Read-only blank fill: no history, highlighting, decorations or cursor.
    pub const fn blank_fill() -> Self {
        Self {
            read_only: true,
            undo_log: false,
            syntax_highlighting: false,
            status_line: false,
            header_line: false,
            cursor: false,
        }
    }
}

/// Face substitution applied to a single content container. Takes precedence
/// over the active theme without touching the global face table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceOverride {
    pub background: String,
    pub foreground: String,
    /// Paint the background past the end of each line.
    pub extend: bool,
}

impl FaceOverride {
    pub fn from_style(style: &StyleRecord) -> Self {
        Self {
            background: style.background_color().to_string(),
            foreground: style.foreground_color().to_string(),
            extend: true,
        }
    }
}

/// Capabilities cellbox needs from the embedding editor.
///
/// Methods take `&self`; hosts keep their own interior mutability since they
/// are driven from a single UI thread. Failures on live objects surface as
/// [`crate::BoxError::Host`]; the metric query fails with
/// [`crate::BoxError::HostUnavailable`].
pub trait Host {
    fn cell_metrics(&self) -> Result<CellMetrics>;

    /// The surface new boxes are parented to.
    fn selected_surface(&self) -> Result<SurfaceId>;

    fn create_surface(&self, params: &SurfaceParams) -> Result<SurfaceId>;

    fn modify_surface(&self, surface: SurfaceId, delta: &SurfaceDelta) -> Result<()>;

    fn is_surface_live(&self, surface: SurfaceId) -> bool;

    /// Destroy a surface. Deleting an already dead surface is not an error.
    fn delete_surface(&self, surface: SurfaceId) -> Result<()>;

    fn create_content(&self, name: &str) -> Result<ContentId>;

    fn fill_content(&self, content: ContentId, text: &str) -> Result<()>;

    fn configure_content(&self, content: ContentId, settings: &ContentSettings) -> Result<()>;

    fn attach_content(&self, surface: SurfaceId, content: ContentId) -> Result<()>;

    /// Install `face` on `content`, replacing any override installed earlier.
    fn set_face_override(&self, content: ContentId, face: &FaceOverride) -> Result<()>;

    fn clear_face_override(&self, content: ContentId) -> Result<()>;

    fn release_content(&self, content: ContentId) -> Result<()>;
}

impl<H: Host + ?Sized> Host for Rc<H> {
    fn cell_metrics(&self) -> Result<CellMetrics> {
        (**self).cell_metrics()
    }

    fn selected_surface(&self) -> Result<SurfaceId> {
        (**self).selected_surface()
    }

    fn create_surface(&self, params: &SurfaceParams) -> Result<SurfaceId> {
        (**self).create_surface(params)
    }

    fn modify_surface(&self, surface: SurfaceId, delta: &SurfaceDelta) -> Result<()> {
        (**self).modify_surface(surface, delta)
    }

    fn is_surface_live(&self, surface: SurfaceId) -> bool {
        (**self).is_surface_live(surface)
    }

    fn delete_surface(&self, surface: SurfaceId) -> Result<()> {
        (**self).delete_surface(surface)
    }

    fn create_content(&self, name: &str) -> Result<ContentId> {
        (**self).create_content(name)
    }

    fn fill_content(&self, content: ContentId, text: &str) -> Result<()> {
        (**self).fill_content(content, text)
    }

    fn configure_content(&self, content: ContentId, settings: &ContentSettings) -> Result<()> {
        (**self).configure_content(content, settings)
    }

    fn attach_content(&self, surface: SurfaceId, content: ContentId) -> Result<()> {
        (**self).attach_content(surface, content)
    }

    fn set_face_override(&self, content: ContentId, face: &FaceOverride) -> Result<()> {
        (**self).set_face_override(content, face)
    }

    fn clear_face_override(&self, content: ContentId) -> Result<()> {
        (**self).clear_face_override(content)
    }

    fn release_content(&self, content: ContentId) -> Result<()> {
        (**self).release_content(content)
    }
}
