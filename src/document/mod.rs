//! Open source documents and the index that tracks which window owns each.
//!
//! The main window holds the authoritative [`DocumentIndex`]. Satellites
//! hold a snapshot copy that is refreshed only by [`IndexUpdate`] messages
//! from the main window.

pub mod index;

pub use index::{DocumentIndex, OwnerUpdate};

use crate::ids::{DocId, WindowId};
use serde::{Deserialize, Serialize};

/// Property key under which a document's owning window is persisted
pub const SOURCE_WINDOW_ID: &str = "source_window_id";

/// One open editable unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable for the document's lifetime
    pub id: DocId,
    /// Unsaved or virtual documents have no path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Owning window (empty = main window)
    #[serde(default)]
    pub source_window_id: WindowId,
}

impl SourceDocument {
    /// A document owned by the main window
    pub fn new(id: impl Into<DocId>, path: Option<String>) -> Self {
        Self {
            id: id.into(),
            path,
            source_window_id: WindowId::main(),
        }
    }

    pub fn with_owner(mut self, window_id: WindowId) -> Self {
        self.source_window_id = window_id;
        self
    }
}

/// Cursor location to reveal when a satellite opens focused on a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub scroll_position: i32,
}

/// A change to the authoritative index, mirrored into satellite snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexUpdate {
    Added(SourceDocument),
    Removed { doc_id: DocId },
    PathChanged { doc_id: DocId, path: String },
    OwnerChanged { doc_id: DocId, window_id: WindowId },
}
