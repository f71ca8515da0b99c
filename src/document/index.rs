//! Ordered index of open documents tagged with their owning window

use super::{IndexUpdate, SourceDocument};
use crate::ids::{DocId, WindowId};

/// Result of changing a document's owner in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerUpdate {
    /// The document already had this owner
    Unchanged,
    /// The owner was changed from `previous`
    Changed { previous: WindowId },
    /// No document with this id is indexed
    Unknown,
}

/// Ordered list of all open documents across all windows.
///
/// Lookups are linear scans; a session rarely has more than a few dozen
/// documents open. Paths and ids are compared by plain value equality with
/// no normalization.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    docs: Vec<SourceDocument>,
}

impl DocumentIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self { docs: Vec::new() }
    }

    /// Create an index from an existing list, dropping duplicate ids
    pub fn from_documents(documents: Vec<SourceDocument>) -> Self {
        let mut index = Self::new();
        for doc in documents {
            index.add(doc);
        }
        index
    }

    pub fn documents(&self) -> &[SourceDocument] {
        &self.docs
    }

    /// Owned copy of the index, handed to satellites at creation time
    pub fn snapshot(&self) -> Vec<SourceDocument> {
        self.docs.clone()
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, doc_id: &DocId) -> Option<&SourceDocument> {
        self.docs.iter().find(|d| &d.id == doc_id)
    }

    /// First document whose path equals `path`
    pub fn find_by_path(&self, path: &str) -> Option<&SourceDocument> {
        self.docs.iter().find(|d| d.path.as_deref() == Some(path))
    }

    /// Owning window of the document at `path`, or `None` if no document
    /// anywhere has that path. The main window is returned as the empty id.
    pub fn find_window_of(&self, path: &str) -> Option<WindowId> {
        self.find_by_path(path).map(|d| d.source_window_id.clone())
    }

    /// Owning window of the document with id `doc_id`
    pub fn find_window_of_id(&self, doc_id: &DocId) -> Option<WindowId> {
        self.get(doc_id).map(|d| d.source_window_id.clone())
    }

    /// Ids of every document owned by `window_id`, in index order
    pub fn owned_by(&self, window_id: &WindowId) -> Vec<DocId> {
        self.docs
            .iter()
            .filter(|d| &d.source_window_id == window_id)
            .map(|d| d.id.clone())
            .collect()
    }

    /// Change the in-memory owner of a document
    pub fn set_owner(&mut self, doc_id: &DocId, window_id: &WindowId) -> OwnerUpdate {
        let Some(doc) = self.docs.iter_mut().find(|d| &d.id == doc_id) else {
            return OwnerUpdate::Unknown;
        };
        if &doc.source_window_id == window_id {
            return OwnerUpdate::Unchanged;
        }
        let previous = std::mem::replace(&mut doc.source_window_id, window_id.clone());
        OwnerUpdate::Changed { previous }
    }

    /// Append a document unless one with the same id is already indexed.
    ///
    /// Returns true if the document was added. Duplicate add events can race
    /// with the replay that happens when a window opens, so a repeat is
    /// ignored rather than treated as an error.
    pub fn add(&mut self, doc: SourceDocument) -> bool {
        if self.get(&doc.id).is_some() {
            crate::debug_log!("DOCS", "Ignoring duplicate add for doc {}", doc.id);
            return false;
        }
        self.docs.push(doc);
        true
    }

    /// Remove the first document with this id
    pub fn remove(&mut self, doc_id: &DocId) -> Option<SourceDocument> {
        let idx = self.docs.iter().position(|d| &d.id == doc_id)?;
        Some(self.docs.remove(idx))
    }

    /// Record a new path after save / save-as. Returns false if the id is unknown.
    pub fn update_path(&mut self, doc_id: &DocId, path: &str) -> bool {
        match self.docs.iter_mut().find(|d| &d.id == doc_id) {
            Some(doc) => {
                doc.path = Some(path.to_string());
                true
            }
            None => false,
        }
    }

    /// Apply a change broadcast by the main window to this snapshot
    pub fn apply(&mut self, update: &IndexUpdate) {
        match update {
            IndexUpdate::Added(doc) => {
                self.add(doc.clone());
            }
            IndexUpdate::Removed { doc_id } => {
                self.remove(doc_id);
            }
            IndexUpdate::PathChanged { doc_id, path } => {
                self.update_path(doc_id, path);
            }
            IndexUpdate::OwnerChanged { doc_id, window_id } => {
                self.set_owner(doc_id, window_id);
            }
        }
    }
}
