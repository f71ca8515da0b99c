//! Registry of the satellite windows currently open.
//!
//! Entries are kept in the order windows were opened so broadcasts and
//! per-window queues visit windows in a stable order.

use crate::ids::WindowId;

/// Opaque handle to a live top-level window, issued by the window system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// One open satellite window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub window_id: WindowId,
    pub ordinal: u32,
    pub handle: WindowHandle,
}

#[derive(Debug, Clone, Default)]
pub struct WindowRegistry {
    entries: Vec<RegistryEntry>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an open window. Re-registering an id replaces its entry in place.
    pub fn register(&mut self, window_id: WindowId, ordinal: u32, handle: WindowHandle) {
        let entry = RegistryEntry {
            window_id,
            ordinal,
            handle,
        };
        match self
            .entries
            .iter_mut()
            .find(|e| e.window_id == entry.window_id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn unregister(&mut self, window_id: &WindowId) -> Option<RegistryEntry> {
        let idx = self.entries.iter().position(|e| &e.window_id == window_id)?;
        Some(self.entries.remove(idx))
    }

    pub fn contains(&self, window_id: &WindowId) -> bool {
        self.get(window_id).is_some()
    }

    pub fn get(&self, window_id: &WindowId) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| &e.window_id == window_id)
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.entries.iter().map(|e| e.window_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries whose handle `is_closed` reports as gone.
    ///
    /// Returns the ids that were removed.
    pub fn prune(&mut self, is_closed: impl Fn(WindowHandle) -> bool) -> Vec<WindowId> {
        let mut removed = Vec::new();
        self.entries.retain(|e| {
            if is_closed(e.handle) {
                removed.push(e.window_id.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}
