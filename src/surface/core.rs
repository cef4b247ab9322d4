use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::host::{ContentId, ContentSettings, FaceOverride, Host, SurfaceDelta, SurfaceParams};
use crate::registry::BoxHandle;
use crate::style::StyleRecord;

/// Blank text written into every backing content container. It has to cover
/// the largest box a caller is expected to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillSettings {
    pub fill_char: char,
    pub columns: u16,
    pub rows: u16,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            fill_char: ' ',
            columns: 256,
            rows: 96,
        }
    }
}

impl FillSettings {
    pub fn text(&self) -> String {
        let line: String = std::iter::repeat(self.fill_char)
            .take(self.columns as usize)
            .collect();
        vec![line; self.rows as usize].join("\n")
    }
}

/// Issues create/update/destroy calls against a [`Host`].
///
/// Besides the host itself the adapter only remembers which content
/// container backs each box, so a container can be released even after its
/// surface was closed behind our back.
pub struct HostSurfaceAdapter<H: Host> {
    host: H,
    fill: FillSettings,
    name_prefix: String,
    created: u64,
    contents: HashMap<BoxHandle, ContentId>,
}

impl<H: Host> HostSurfaceAdapter<H> {
    pub fn new(host: H, fill: FillSettings, name_prefix: impl Into<String>) -> Self {
        Self {
            host,
            fill,
            name_prefix: name_prefix.into(),
            created: 0,
            contents: HashMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Create the child surface and its blank, read-only backing content.
    ///
    /// If any step after the surface exists fails, the surface is deleted
    /// again before the error is returned.
    pub fn create(&mut self, params: &SurfaceParams, style: &StyleRecord) -> Result<BoxHandle> {
        let surface = self.host.create_surface(params)?;
        self.created += 1;
        let handle = BoxHandle::new(surface, self.created);

        let name = format!("{}-{}*", self.name_prefix, self.created);
        match self.prepare_content(&name, style) {
            Ok(content) => match self.host.attach_content(surface, content) {
                Ok(()) => {
                    self.contents.insert(handle, content);
                    Ok(handle)
                }
                Err(err) => {
                    let _ = self.host.release_content(content);
                    let _ = self.host.delete_surface(surface);
                    Err(err)
                }
            },
            Err(err) => {
                let _ = self.host.delete_surface(surface);
                Err(err)
            }
        }
    }

    fn prepare_content(&self, name: &str, style: &StyleRecord) -> Result<ContentId> {
        let content = self.host.create_content(name)?;
        let prepared = self
            .host
            .fill_content(content, &self.fill.text())
            .and_then(|_| {
                self.host
                    .configure_content(content, &ContentSettings::blank_fill())
            })
            .and_then(|_| {
                self.host
                    .set_face_override(content, &FaceOverride::from_style(style))
            });
        match prepared {
            Ok(()) => Ok(content),
            Err(err) => {
                let _ = self.host.release_content(content);
                Err(err)
            }
        }
    }

    /// The box was created here, not yet destroyed, and its surface is live.
    /// A surface id the host recycled for a newer box does not count.
    pub fn is_alive(&self, handle: BoxHandle) -> bool {
        self.contents.contains_key(&handle) && self.host.is_surface_live(handle.surface())
    }

    /// Apply `delta` to a live box. Returns `false` when nothing was sent.
    pub fn update(&self, handle: BoxHandle, delta: &SurfaceDelta) -> Result<bool> {
        if delta.is_empty() || !self.is_alive(handle) {
            return Ok(false);
        }
        self.host.modify_surface(handle.surface(), delta)?;
        Ok(true)
    }

    /// Re-install the fill face on the box's content container. The host
    /// replaces the previous override rather than stacking a new one.
    pub fn set_content_style(&self, handle: BoxHandle, style: &StyleRecord) -> Result<bool> {
        if !self.is_alive(handle) {
            return Ok(false);
        }
        let Some(content) = self.contents.get(&handle).copied() else {
            return Ok(false);
        };
        self.host
            .set_face_override(content, &FaceOverride::from_style(style))?;
        Ok(true)
    }

    /// Release the box's surface and content. Safe to call repeatedly.
    /// Returns `true` only when a live surface was deleted.
    pub fn destroy(&mut self, handle: BoxHandle) -> Result<bool> {
        let alive = self.is_alive(handle);
        if alive {
            self.host.delete_surface(handle.surface())?;
        }
        if let Some(content) = self.contents.remove(&handle) {
            // Release even if the face could not be cleared.
            let cleared = self.host.clear_face_override(content);
            let released = self.host.release_content(content);
            cleared.and(released)?;
        }
        Ok(alive)
    }
}
