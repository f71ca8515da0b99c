//! Error types for the source-window coordinator.
//!
//! Collaborators report failures as `anyhow::Error`; the manager folds them
//! into [`SourceWindowError`] so callers can tell which step failed.

use crate::ids::{DocId, WindowId};

/// Errors raised while coordinating source windows
#[derive(Debug, thiserror::Error)]
pub enum SourceWindowError {
    /// Writing a document's owning window to the property store failed
    #[error("Failed to persist owner of document {doc_id}: {message}")]
    Persistence { doc_id: DocId, message: String },

    /// Reading or writing the geometry blob failed
    #[error("Failed to persist window geometry: {0}")]
    GeometryPersistence(String),

    /// The window system refused to open a satellite
    #[error("Failed to open window {name}: {message}")]
    WindowOpen { name: String, message: String },

    /// A request to a satellite window failed or got the wrong answer
    #[error("Satellite {window_id} request failed: {message}")]
    Satellite { window_id: WindowId, message: String },

    /// An operation that only the main window may perform was called in a satellite
    #[error("{0} is only available in the main window")]
    NotMainWindow(&'static str),
}

impl SourceWindowError {
    pub(crate) fn persistence(doc_id: &DocId, err: &anyhow::Error) -> Self {
        Self::Persistence {
            doc_id: doc_id.clone(),
            message: format!("{err:#}"),
        }
    }

    pub(crate) fn satellite(window_id: &WindowId, err: impl std::fmt::Display) -> Self {
        Self::Satellite {
            window_id: window_id.clone(),
            message: err.to_string(),
        }
    }
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, SourceWindowError>;
