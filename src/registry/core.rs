use std::fmt;

use crate::host::SurfaceId;

/// Opaque reference to a box. Copying a handle never duplicates the box.
///
/// Two handles are equal only if they share both the surface and the
/// creation serial, so a host that recycles surface ids still yields a
/// fresh handle for every box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxHandle {
    surface: SurfaceId,
    serial: u64,
}

impl BoxHandle {
    pub(crate) fn new(surface: SurfaceId, serial: u64) -> Self {
        Self { surface, serial }
    }

    /// Host surface backing this box.
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Position of this box in its adapter's creation order, starting at 1.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl fmt::Display for BoxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "box{}@{}", self.serial, self.surface)
    }
}

/// Ordered set of handles created by one controller and not yet deleted.
///
/// Serials only grow, so a removed handle can never be handed out again and
/// nothing has to be remembered after removal.
#[derive(Debug, Default)]
pub struct BoxRegistry {
    entries: Vec<BoxHandle>,
}

impl BoxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `handle`. Returns `false` if it is already tracked.
    pub fn add(&mut self, handle: BoxHandle) -> bool {
        if self.entries.contains(&handle) {
            return false;
        }
        self.entries.push(handle);
        true
    }

    /// Stop tracking `handle`. Unknown handles are ignored.
    pub fn remove(&mut self, handle: BoxHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| *entry != handle);
        self.entries.len() != before
    }

    /// Handles in insertion order.
    pub fn all(&self) -> &[BoxHandle] {
        &self.entries
    }

    pub fn contains(&self, handle: BoxHandle) -> bool {
        self.entries.contains(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
