//! Typed request/response protocol between the main window and satellites.
//!
//! Each satellite answers a closed set of requests through one
//! [`SatelliteRequestHandler`]. [`LocalSatelliteChannel`] routes requests to
//! handlers living in the same process; a host that runs satellites
//! elsewhere implements [`SatelliteChannel`] over its own transport.

use crate::ids::{DocId, WindowId};
use crate::traits::SatelliteChannel;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A document with changes not yet written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsavedChangesItem {
    pub id: DocId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub title: String,
}

/// Requests the main window sends to a satellite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum SatelliteRequest {
    SaveAllUnsaved,
    CloseAllDocs { caption: String },
    GetUnsavedChanges,
    GetCurrentDocPath,
    /// Save what the user chose to keep; satellites ignore items they don't own
    HandleUnsavedChangesBeforeExit { items: Vec<UnsavedChangesItem> },
    SaveWithPrompt { item: UnsavedChangesItem },
}

impl SatelliteRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SaveAllUnsaved => "save_all_unsaved",
            Self::CloseAllDocs { .. } => "close_all_docs",
            Self::GetUnsavedChanges => "get_unsaved_changes",
            Self::GetCurrentDocPath => "get_current_doc_path",
            Self::HandleUnsavedChangesBeforeExit { .. } => "handle_unsaved_changes_before_exit",
            Self::SaveWithPrompt { .. } => "save_with_prompt",
        }
    }
}

/// Answers from a satellite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "response", content = "value", rename_all = "snake_case")]
pub enum SatelliteResponse {
    /// The request (and any prompt it raised) has completed
    Done,
    UnsavedChanges(Vec<UnsavedChangesItem>),
    CurrentDocPath(Option<String>),
}

impl SatelliteResponse {
    pub fn into_unsaved_changes(self) -> Result<Vec<UnsavedChangesItem>> {
        match self {
            Self::UnsavedChanges(items) => Ok(items),
            other => Err(anyhow!("expected unsaved changes, got {:?}", other)),
        }
    }

    pub fn into_current_doc_path(self) -> Result<Option<String>> {
        match self {
            Self::CurrentDocPath(path) => Ok(path),
            other => Err(anyhow!("expected current doc path, got {:?}", other)),
        }
    }

    pub fn into_done(self) -> Result<()> {
        match self {
            Self::Done => Ok(()),
            other => Err(anyhow!("expected completion, got {:?}", other)),
        }
    }
}

/// Satellite-side handler; one per satellite window.
///
/// Methods that may prompt the user resolve only once the user is done.
#[async_trait]
pub trait SatelliteRequestHandler: Send {
    async fn save_all_unsaved(&mut self) -> Result<()>;
    async fn close_all_docs(&mut self, caption: &str) -> Result<()>;
    async fn unsaved_changes(&mut self) -> Result<Vec<UnsavedChangesItem>>;
    async fn current_doc_path(&mut self) -> Result<Option<String>>;
    async fn handle_unsaved_changes_before_exit(
        &mut self,
        items: &[UnsavedChangesItem],
    ) -> Result<()>;
    async fn save_with_prompt(&mut self, item: &UnsavedChangesItem) -> Result<()>;
}

/// Dispatch one request to a handler
pub async fn dispatch(
    handler: &mut (dyn SatelliteRequestHandler + '_),
    request: SatelliteRequest,
) -> Result<SatelliteResponse> {
    let response = match request {
        SatelliteRequest::SaveAllUnsaved => {
            handler.save_all_unsaved().await?;
            SatelliteResponse::Done
        }
        SatelliteRequest::CloseAllDocs { caption } => {
            handler.close_all_docs(&caption).await?;
            SatelliteResponse::Done
        }
        SatelliteRequest::GetUnsavedChanges => {
            SatelliteResponse::UnsavedChanges(handler.unsaved_changes().await?)
        }
        SatelliteRequest::GetCurrentDocPath => {
            SatelliteResponse::CurrentDocPath(handler.current_doc_path().await?)
        }
        SatelliteRequest::HandleUnsavedChangesBeforeExit { items } => {
            handler.handle_unsaved_changes_before_exit(&items).await?;
            SatelliteResponse::Done
        }
        SatelliteRequest::SaveWithPrompt { item } => {
            handler.save_with_prompt(&item).await?;
            SatelliteResponse::Done
        }
    };
    Ok(response)
}

type SharedHandler = Arc<tokio::sync::Mutex<Box<dyn SatelliteRequestHandler>>>;

/// In-process [`SatelliteChannel`] backed by registered handlers.
///
/// Requests to the same satellite are handled one at a time.
#[derive(Clone, Default)]
pub struct LocalSatelliteChannel {
    handlers: Arc<Mutex<HashMap<WindowId, SharedHandler>>>,
}

impl LocalSatelliteChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, window_id: WindowId, handler: Box<dyn SatelliteRequestHandler>) {
        self.handlers
            .lock()
            .insert(window_id, Arc::new(tokio::sync::Mutex::new(handler)));
    }

    pub fn unregister(&self, window_id: &WindowId) -> bool {
        self.handlers.lock().remove(window_id).is_some()
    }

    pub fn is_registered(&self, window_id: &WindowId) -> bool {
        self.handlers.lock().contains_key(window_id)
    }
}

impl std::fmt::Debug for LocalSatelliteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSatelliteChannel")
            .field("handlers", &self.handlers.lock().len())
            .finish()
    }
}

#[async_trait]
impl SatelliteChannel for LocalSatelliteChannel {
    async fn request(
        &self,
        window_id: &WindowId,
        request: SatelliteRequest,
    ) -> Result<SatelliteResponse> {
        // Clone the handle out so the registry lock is not held across the await
        let handler = self
            .handlers
            .lock()
            .get(window_id)
            .cloned()
            .ok_or_else(|| anyhow!("no handler registered for satellite {}", window_id))?;

        crate::debug_trace!("SATELLITE", "-> {} {}", window_id, request.name());
        let mut guard = handler.lock().await;
        dispatch(guard.as_mut(), request).await
    }
}
