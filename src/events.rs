//! Messages exchanged between source windows and the events the manager
//! reacts to.

use crate::document::{IndexUpdate, SourceDocument, SourcePosition};
use crate::geometry::Point;
use crate::ids::{DocId, WindowId};
use serde::{Deserialize, Serialize};

/// Events delivered between windows over the message bus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrossWindowEvent {
    /// Open (or reveal) a file, optionally at a position
    OpenSourceFile {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourcePosition>,
    },
    /// Navigate inside a code browser tab
    CodeBrowserNavigation {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<SourcePosition>,
    },
    /// A document moved from one window to another
    DocWindowChanged(DocWindowChange),
    /// A tab drag started in some window; every window shows drop targets
    DocTabDragStarted {
        doc_id: DocId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
    /// Status of a running application changed (e.g. a preview server)
    ApplicationStatus { app_id: String, state: String },
    /// A change to the authoritative document index
    Index(IndexUpdate),
}

/// A document moving from one window to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocWindowChange {
    pub doc_id: DocId,
    pub old_window_id: WindowId,
    pub new_window_id: WindowId,
    /// Tab slot the document should land in, if the receiver cares
    #[serde(default)]
    pub tab_index: Option<u32>,
}

impl DocWindowChange {
    pub fn new(doc_id: DocId, old_window_id: WindowId, new_window_id: WindowId) -> Self {
        Self {
            doc_id,
            old_window_id,
            new_window_id,
            tab_index: None,
        }
    }
}

impl CrossWindowEvent {
    /// Ownership change notice without a preferred tab slot
    pub fn doc_window_changed(doc_id: DocId, old_window_id: WindowId, new_window_id: WindowId) -> Self {
        Self::DocWindowChanged(DocWindowChange::new(doc_id, old_window_id, new_window_id))
    }

    /// Short name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OpenSourceFile { .. } => "open_source_file",
            Self::CodeBrowserNavigation { .. } => "code_browser_navigation",
            Self::DocWindowChanged(_) => "doc_window_changed",
            Self::DocTabDragStarted { .. } => "doc_tab_drag_started",
            Self::ApplicationStatus { .. } => "application_status",
            Self::Index(_) => "index",
        }
    }

    /// Encode for a string-based message bus
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Events raised inside a window that the manager handles
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// Move a document into a brand new satellite
    PopoutDoc {
        doc_id: DocId,
        position: Option<Point>,
        source_position: Option<SourcePosition>,
    },
    /// A document was opened in `window_id`
    SourceDocAdded { doc: SourceDocument, window_id: WindowId },
    /// Save or save-as gave a document a (new) path
    SourceFileSaved { doc_id: DocId, path: String },
    /// A code browser tab was created for `path`
    CodeBrowserCreated { doc_id: DocId, path: String },
    /// A satellite window unloaded (closed or reloading)
    SatelliteClosed { name: String },
    /// A satellite window gained focus
    SatelliteFocused { name: String },
    /// The application is shutting down every satellite
    AllSatellitesClosing,
    /// A document tab was closed in some window
    DocTabClosed { doc_id: DocId },
    /// An event that arrived over the message bus
    CrossWindow(CrossWindowEvent),
}

/// What the caller should do with an event after the manager saw it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Fully handled
    Consumed,
    /// The host window should also act on this event (e.g. add or drop a tab)
    Forward(CrossWindowEvent),
}
