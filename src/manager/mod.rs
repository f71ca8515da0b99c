//! Source-window manager: document ownership, navigation routing and
//! satellite lifecycle for one window.
//!
//! Every window (main or satellite) runs one [`SourceWindowManager`]. The
//! main window holds the authoritative [`DocumentIndex`], the registry of
//! open satellites and their geometry; a satellite holds a snapshot of the
//! index it was handed at creation, refreshed by [`IndexUpdate`] broadcasts.
//!
//! The manager itself is synchronous. Calls that wait on a collaborator
//! (ownership writes, close monitoring) run as tasks on an internal
//! [`JoinSet`]; their results come back through [`SourceWindowManager::settle`]
//! or [`SourceWindowManager::next_completion`], which the host polls from its
//! event loop. In-memory state is always updated before a task is spawned.
//!
//! Sub-modules split the implementation by concern:
//! - `navigation`: routing a navigation request to the owning window
//! - `broadcast`: fan-out to satellites and ownership-change relaying
//! - `lifecycle`: opening, closing and restoring satellites, geometry
//! - `handlers`: dispatch of window events
//! - `satellite_ops`: serialized per-satellite requests (save, close, query)

mod broadcast;
mod handlers;
mod lifecycle;
mod navigation;
mod satellite_ops;

pub use navigation::NavigationResult;

use crate::config::Config;
use crate::document::{
    DocumentIndex, IndexUpdate, OwnerUpdate, SOURCE_WINDOW_ID, SourceDocument, SourcePosition,
};
use crate::events::{CrossWindowEvent, DocWindowChange};
use crate::geometry::{GeometryMap, GeometryTracker, Point};
use crate::ids::{DocId, WindowId};
use crate::registry::WindowRegistry;
use crate::traits::{Collaborators, SourceWindowParams};
use std::collections::HashMap;
use std::future::Future;
use tokio::task::{JoinError, JoinSet};

/// Title of the error shown when an ownership write fails
const MOVE_FAILED_TITLE: &str = "Can't Move Doc";

/// Work the manager must do once a background task finishes
#[derive(Debug)]
enum Followup {
    /// Open a satellite (after its document was assigned to it)
    OpenWindow {
        window_id: WindowId,
        position: Option<Point>,
        doc_id: Option<DocId>,
        source_position: Option<SourcePosition>,
    },
    /// Relay an ownership change (after the new owner was recorded)
    BroadcastOwnerChange(DocWindowChange),
    /// The close monitor confirmed a satellite is gone
    WindowClosed(WindowId),
    /// The close monitor saw the satellite come back
    WindowReloaded(WindowId),
    /// An orphaned document was closed on the backend
    DocumentClosed(DocId),
}

/// What to do after an ownership write succeeds
#[derive(Debug)]
enum AfterAssign {
    Nothing,
    /// Close the document on the backend as well
    CloseDocument,
    Then(Followup),
}

/// Document ownership and satellite coordination for one window.
///
/// # Panics
///
/// Calls that start background work (`assign_owner`, `pop_out`,
/// `close_window`, `handle_event` for pop-outs, closes and ownership moves)
/// spawn onto the current Tokio runtime and panic when called outside one.
/// Drive the manager from inside a runtime, e.g. a `#[tokio::main]` event loop.
pub struct SourceWindowManager {
    config: Config,
    /// This window's id (empty for the main window)
    window_id: WindowId,
    /// This window's ordinal (0 for the main window)
    ordinal: u32,
    documents: DocumentIndex,
    registry: WindowRegistry,
    geometry: GeometryTracker,
    /// Set once the application starts shutting every satellite down
    windows_closing: bool,
    last_focused: WindowId,
    most_recent: WindowId,
    collab: Collaborators,
    pending: JoinSet<Option<Followup>>,
}

impl SourceWindowManager {
    /// Create the main window's manager.
    ///
    /// `documents` is the session's list of open documents. Satellites named
    /// as owners by any of them are reopened with their saved geometry.
    pub async fn new_main(
        config: Config,
        collab: Collaborators,
        documents: Vec<SourceDocument>,
    ) -> Self {
        let persisted = match collab.geometry.load().await {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Failed to load source window geometry: {:#}", e);
                GeometryMap::new()
            }
        };

        let mut manager = Self {
            config,
            window_id: WindowId::main(),
            ordinal: 0,
            documents: DocumentIndex::from_documents(documents),
            registry: WindowRegistry::new(),
            geometry: GeometryTracker::from_persisted(persisted),
            windows_closing: false,
            last_focused: WindowId::main(),
            most_recent: WindowId::main(),
            collab,
            pending: JoinSet::new(),
        };
        manager.restore_windows();
        manager
    }

    /// Create a satellite's manager from the parameters it was opened with
    pub fn new_satellite(
        config: Config,
        collab: Collaborators,
        window_id: WindowId,
        params: SourceWindowParams,
    ) -> Self {
        crate::debug_info!(
            "MANAGER",
            "Satellite {} starting with ordinal {} and {} documents",
            window_id,
            params.ordinal,
            params.documents.len()
        );
        Self {
            config,
            window_id,
            ordinal: params.ordinal,
            documents: DocumentIndex::from_documents(params.documents),
            registry: WindowRegistry::new(),
            geometry: GeometryTracker::new(),
            windows_closing: false,
            last_focused: WindowId::main(),
            most_recent: WindowId::main(),
            collab,
            pending: JoinSet::new(),
        }
    }

    pub fn is_main(&self) -> bool {
        self.window_id.is_main()
    }

    pub fn window_id(&self) -> &WindowId {
        &self.window_id
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    pub fn set_ordinal(&mut self, ordinal: u32) {
        self.ordinal = ordinal;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Open documents: authoritative in the main window, a snapshot in satellites
    pub fn documents(&self) -> &[SourceDocument] {
        self.documents.documents()
    }

    pub fn find_window_of(&self, path: &str) -> Option<WindowId> {
        self.documents.find_window_of(path)
    }

    pub fn find_window_of_id(&self, doc_id: &DocId) -> Option<WindowId> {
        self.documents.find_window_of_id(doc_id)
    }

    pub fn last_focused_window_id(&self) -> &WindowId {
        &self.last_focused
    }

    pub fn set_last_focused_window_id(&mut self, window_id: WindowId) {
        self.last_focused = window_id;
    }

    pub fn most_recent_window_id(&self) -> &WindowId {
        &self.most_recent
    }

    pub fn windows_closing(&self) -> bool {
        self.windows_closing
    }

    /// Ids of registered satellites, in the order they were opened
    pub fn open_window_ids(&self) -> Vec<WindowId> {
        self.registry.window_ids()
    }

    /// Last persisted (or staged) satellite geometry
    pub fn geometry(&self) -> &GeometryMap {
        self.geometry.geometry()
    }

    /// Whether background work is still in flight
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    // ── Ownership ───────────────────────────────────────────────────────────

    /// Make `window_id` the owner of a document.
    ///
    /// The in-memory owner changes immediately. In the main window the change
    /// is then written to the property store in the background; a failed
    /// write is shown to the user and not rolled back. Satellites only
    /// record the claim locally, the main window persists it when notified.
    ///
    /// Returns false if the document already had this owner.
    pub fn assign_owner(&mut self, doc_id: &DocId, window_id: &WindowId) -> bool {
        self.assign_owner_then(doc_id, window_id, AfterAssign::Nothing)
    }

    fn assign_owner_then(
        &mut self,
        doc_id: &DocId,
        window_id: &WindowId,
        after: AfterAssign,
    ) -> bool {
        match self.documents.set_owner(doc_id, window_id) {
            OwnerUpdate::Unchanged => {
                crate::debug_trace!("OWNER", "Doc {} already owned by {}", doc_id, window_id);
                return false;
            }
            OwnerUpdate::Changed { previous } => {
                crate::debug_info!(
                    "OWNER",
                    "Doc {} moved from {} to {}",
                    doc_id,
                    previous,
                    window_id
                );
                if self.is_main() {
                    self.broadcast(&CrossWindowEvent::Index(IndexUpdate::OwnerChanged {
                        doc_id: doc_id.clone(),
                        window_id: window_id.clone(),
                    }));
                }
            }
            OwnerUpdate::Unknown => {
                crate::debug_log!("OWNER", "Doc {} not indexed; persisting owner only", doc_id);
            }
        }

        if self.is_main() {
            self.persist_owner(doc_id.clone(), window_id.clone(), after);
        } else {
            match after {
                AfterAssign::Then(followup) => self.apply_followup(followup),
                AfterAssign::CloseDocument => {
                    log::warn!("Satellite {} cannot close doc {}", self.window_id, doc_id)
                }
                AfterAssign::Nothing => {}
            }
        }
        true
    }

    /// Write a document's owner to the property store in the background
    fn persist_owner(&mut self, doc_id: DocId, window_id: WindowId, after: AfterAssign) {
        let store = self.collab.store.clone();
        let display = self.collab.display.clone();
        self.spawn(async move {
            let mut props = HashMap::new();
            props.insert(SOURCE_WINDOW_ID.to_string(), window_id.as_str().to_string());

            if let Err(e) = store.modify_document_properties(&doc_id, props).await {
                let err = crate::error::SourceWindowError::persistence(&doc_id, &e);
                log::error!("{}", err);
                display.show_error_message(
                    MOVE_FAILED_TITLE,
                    &format!(
                        "The document could not be moved to a different window: \n{:#}",
                        e
                    ),
                );
                return None;
            }

            match after {
                AfterAssign::Nothing => None,
                AfterAssign::Then(followup) => Some(followup),
                AfterAssign::CloseDocument => {
                    if let Err(e) = store.close_document(&doc_id).await {
                        log::warn!("Failed to close doc {}: {:#}", doc_id, e);
                    }
                    Some(Followup::DocumentClosed(doc_id))
                }
            }
        });
    }

    // ── Background work ─────────────────────────────────────────────────────

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Option<Followup>> + Send + 'static,
    {
        self.pending.spawn(task);
    }

    /// Wait for all background work, applying each result as it lands.
    ///
    /// Results may queue more work (closing a satellite's documents, say);
    /// that work is awaited as well.
    pub async fn settle(&mut self) {
        while let Some(joined) = self.pending.join_next().await {
            self.finish_task(joined);
        }
    }

    /// Wait for one background task and apply its result.
    ///
    /// Returns false immediately when nothing is pending. Intended for a
    /// host's `select!` loop.
    pub async fn next_completion(&mut self) -> bool {
        match self.pending.join_next().await {
            Some(joined) => {
                self.finish_task(joined);
                true
            }
            None => false,
        }
    }

    fn finish_task(&mut self, joined: Result<Option<Followup>, JoinError>) {
        match joined {
            Ok(Some(followup)) => self.apply_followup(followup),
            Ok(None) => {}
            Err(e) => crate::debug_error!("MANAGER", "Source window task failed: {}", e),
        }
    }

    fn apply_followup(&mut self, followup: Followup) {
        crate::debug_trace!("MANAGER", "Applying {:?}", followup);
        match followup {
            Followup::OpenWindow {
                window_id,
                position,
                doc_id,
                source_position,
            } => {
                if let Err(e) = self.open_window(window_id, position, doc_id, source_position) {
                    log::error!("{}", e);
                }
            }
            Followup::BroadcastOwnerChange(change) => self.broadcast_owner_change(&change),
            Followup::WindowClosed(window_id) => {
                // shutdown may have started while the monitor was waiting
                if self.windows_closing {
                    crate::debug_info!("CLOSE", "Ignoring close of {} during shutdown", window_id);
                } else {
                    self.close_window(&window_id);
                }
            }
            Followup::WindowReloaded(window_id) => {
                crate::debug_info!("CLOSE", "Satellite {} reloaded; keeping its documents", window_id);
            }
            Followup::DocumentClosed(doc_id) => {
                if self.documents.remove(&doc_id).is_some() {
                    self.broadcast(&CrossWindowEvent::Index(IndexUpdate::Removed { doc_id }));
                }
            }
        }
    }
}

impl std::fmt::Debug for SourceWindowManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceWindowManager")
            .field("window_id", &self.window_id)
            .field("documents", &self.documents.len())
            .field("open_windows", &self.registry.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}
