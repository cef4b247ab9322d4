use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::{BoxError, Result};
use crate::geometry::CellMetrics;

use super::{ContentId, ContentSettings, FaceOverride, Host, SurfaceDelta, SurfaceId, SurfaceParams};

/// Surface every box is parented to unless another one is selected.
pub const ROOT_SURFACE: SurfaceId = SurfaceId(0);

/// Mutating host calls, in the order they were issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CreateSurface(SurfaceId),
    ModifySurface(SurfaceId, SurfaceDelta),
    DeleteSurface(SurfaceId),
    CreateContent(ContentId),
    FillContent(ContentId, usize),
    ConfigureContent(ContentId),
    AttachContent(SurfaceId, ContentId),
    SetFaceOverride(ContentId, FaceOverride),
    ClearFaceOverride(ContentId),
    ReleaseContent(ContentId),
}

/// Recorded state of a content container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryContent {
    pub name: String,
    pub text: String,
    pub settings: Option<ContentSettings>,
    pub face: Option<FaceOverride>,
}

#[derive(Debug)]
struct MemoryState {
    next_id: u64,
    metrics: Option<CellMetrics>,
    selected: SurfaceId,
    surfaces: HashMap<SurfaceId, SurfaceParams>,
    attached: HashMap<SurfaceId, ContentId>,
    contents: HashMap<ContentId, MemoryContent>,
    calls: Vec<HostCall>,
    fail_deletes: bool,
    fail_face_clears: bool,
    recycle_surface_ids: bool,
}

/// Deterministic in-memory host.
///
/// Identifiers are handed out from a single increasing counter and are not
/// reused unless [`MemoryHost::set_recycle_surface_ids`] is on. Useful for tests and for embedders that replay the recorded calls
/// onto their own windowing layer.
#[derive(Debug)]
pub struct MemoryHost {
    state: RefCell<MemoryState>,
}

impl MemoryHost {
    pub fn new(metrics: CellMetrics) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                next_id: 1,
                metrics: Some(metrics),
                selected: ROOT_SURFACE,
                surfaces: HashMap::new(),
                attached: HashMap::new(),
                contents: HashMap::new(),
                calls: Vec::new(),
                fail_deletes: false,
                fail_face_clears: false,
                recycle_surface_ids: false,
            }),
        }
    }

    /// Change the reported cell size; `None` makes metric queries fail.
    pub fn set_cell_metrics(&self, metrics: Option<CellMetrics>) {
        self.state.borrow_mut().metrics = metrics;
    }

    pub fn select_surface(&self, surface: SurfaceId) {
        self.state.borrow_mut().selected = surface;
    }

    /// Make subsequent `delete_surface` calls fail on live surfaces.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.state.borrow_mut().fail_deletes = fail;
    }

    pub fn set_fail_face_clears(&self, fail: bool) {
        self.state.borrow_mut().fail_face_clears = fail;
    }

    /// Hand out the lowest free surface id instead of a fresh one, as some
    /// window systems do.
    pub fn set_recycle_surface_ids(&self, recycle: bool) {
        self.state.borrow_mut().recycle_surface_ids = recycle;
    }

    /// Drop a surface without going through the host API, as when the user
    /// closes it from the window manager.
    pub fn close_externally(&self, surface: SurfaceId) {
        let mut state = self.state.borrow_mut();
        state.surfaces.remove(&surface);
        state.attached.remove(&surface);
    }

    pub fn surface(&self, surface: SurfaceId) -> Option<SurfaceParams> {
        self.state.borrow().surfaces.get(&surface).cloned()
    }

    pub fn attached_content(&self, surface: SurfaceId) -> Option<ContentId> {
        self.state.borrow().attached.get(&surface).copied()
    }

    pub fn content(&self, content: ContentId) -> Option<MemoryContent> {
        self.state.borrow().contents.get(&content).cloned()
    }

    pub fn live_surfaces(&self) -> Vec<SurfaceId> {
        let mut ids: Vec<_> = self.state.borrow().surfaces.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn content_count(&self) -> usize {
        self.state.borrow().contents.len()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn with_content<T>(
        &self,
        content: ContentId,
        call: HostCall,
        f: impl FnOnce(&mut MemoryContent) -> T,
    ) -> Result<T> {
        let mut state = self.state.borrow_mut();
        let entry = state
            .contents
            .get_mut(&content)
            .ok_or_else(|| BoxError::Host(format!("no content container #{}", content.0)))?;
        let out = f(entry);
        state.calls.push(call);
        Ok(out)
    }
}

impl MemoryState {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn allocate_surface(&mut self) -> SurfaceId {
        if self.recycle_surface_ids {
            let free = (1..)
                .map(SurfaceId)
                .find(|id| !self.surfaces.contains_key(id));
            if let Some(id) = free {
                return id;
            }
        }
        SurfaceId(self.allocate())
    }

    fn is_live(&self, surface: SurfaceId) -> bool {
        surface == ROOT_SURFACE || self.surfaces.contains_key(&surface)
    }
}

impl Host for MemoryHost {
    fn cell_metrics(&self) -> Result<CellMetrics> {
        self.state
            .borrow()
            .metrics
            .ok_or_else(|| BoxError::HostUnavailable("cell metrics not reported".to_string()))
    }

    fn selected_surface(&self) -> Result<SurfaceId> {
        let state = self.state.borrow();
        if state.is_live(state.selected) {
            Ok(state.selected)
        } else {
            Err(BoxError::HostUnavailable(format!(
                "selected {} is gone",
                state.selected
            )))
        }
    }

    fn create_surface(&self, params: &SurfaceParams) -> Result<SurfaceId> {
        let mut state = self.state.borrow_mut();
        if !state.is_live(params.parent) {
            return Err(BoxError::Host(format!("parent {} is not live", params.parent)));
        }
        let id = state.allocate_surface();
        state.surfaces.insert(id, params.clone());
        state.calls.push(HostCall::CreateSurface(id));
        Ok(id)
    }

    fn modify_surface(&self, surface: SurfaceId, delta: &SurfaceDelta) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let params = state
            .surfaces
            .get_mut(&surface)
            .ok_or_else(|| BoxError::Host(format!("{surface} is not live")))?;
        delta.apply_to(params);
        state
            .calls
            .push(HostCall::ModifySurface(surface, delta.clone()));
        Ok(())
    }

    fn is_surface_live(&self, surface: SurfaceId) -> bool {
        self.state.borrow().surfaces.contains_key(&surface)
    }

    fn delete_surface(&self, surface: SurfaceId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.surfaces.contains_key(&surface) {
            return Ok(());
        }
        if state.fail_deletes {
            return Err(BoxError::Host(format!("refused to delete {surface}")));
        }
        state.surfaces.remove(&surface);
        state.attached.remove(&surface);
        state.calls.push(HostCall::DeleteSurface(surface));
        Ok(())
    }

    fn create_content(&self, name: &str) -> Result<ContentId> {
        let mut state = self.state.borrow_mut();
        let id = ContentId(state.allocate());
        state.contents.insert(
            id,
            MemoryContent {
                name: name.to_string(),
                text: String::new(),
                settings: None,
                face: None,
            },
        );
        state.calls.push(HostCall::CreateContent(id));
        Ok(id)
    }

    fn fill_content(&self, content: ContentId, text: &str) -> Result<()> {
        self.with_content(content, HostCall::FillContent(content, text.len()), |entry| {
            entry.text = text.to_string();
        })
    }

    fn configure_content(&self, content: ContentId, settings: &ContentSettings) -> Result<()> {
        self.with_content(content, HostCall::ConfigureContent(content), |entry| {
            entry.settings = Some(*settings);
        })
    }

    fn attach_content(&self, surface: SurfaceId, content: ContentId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if !state.surfaces.contains_key(&surface) {
            return Err(BoxError::Host(format!("{surface} is not live")));
        }
        if !state.contents.contains_key(&content) {
            return Err(BoxError::Host(format!(
                "no content container #{}",
                content.0
            )));
        }
        state.attached.insert(surface, content);
        state.calls.push(HostCall::AttachContent(surface, content));
        Ok(())
    }

    fn set_face_override(&self, content: ContentId, face: &FaceOverride) -> Result<()> {
        self.with_content(
            content,
            HostCall::SetFaceOverride(content, face.clone()),
            |entry| entry.face = Some(face.clone()),
        )
    }

    fn clear_face_override(&self, content: ContentId) -> Result<()> {
        if self.state.borrow().fail_face_clears {
            return Err(BoxError::Host(format!(
                "refused to clear face on content #{}",
                content.0
            )));
        }
        self.with_content(content, HostCall::ClearFaceOverride(content), |entry| {
            entry.face = None;
        })
    }

    fn release_content(&self, content: ContentId) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.contents.remove(&content).is_some() {
            state.calls.push(HostCall::ReleaseContent(content));
        }
        Ok(())
    }
}
