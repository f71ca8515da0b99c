//! Contracts for the collaborators the source-window manager drives.
//!
//! The manager never touches a window system, a server or a transport
//! directly. Each of those sits behind one of the traits below so that a
//! host application can plug in its own implementation and tests can plug
//! in recording fakes (see `tests/common/mod.rs`).

use crate::document::{SourceDocument, SourcePosition};
use crate::events::CrossWindowEvent;
use crate::geometry::{GeometryMap, Point, ScreenGeometry, Size};
use crate::ids::{DocId, WindowId};
use crate::registry::WindowHandle;
use crate::satellite::{SatelliteRequest, SatelliteResponse};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

// ── Persistence ──────────────────────────────────────────────────────────────

/// Durable key/value store for document metadata.
///
/// Both calls go to a server and may fail. The only key written by the
/// manager is [`crate::document::SOURCE_WINDOW_ID`].
#[async_trait]
pub trait PropertyStore: Send + Sync {
    async fn modify_document_properties(
        &self,
        doc_id: &DocId,
        properties: HashMap<String, String>,
    ) -> Result<()>;

    /// Close a document on the backend. Callers do not wait on the outcome.
    async fn close_document(&self, doc_id: &DocId) -> Result<()>;
}

/// Storage for the per-window geometry blob
#[async_trait]
pub trait GeometryPersistence: Send + Sync {
    async fn load(&self) -> Result<GeometryMap>;
    async fn save(&self, geometry: &GeometryMap) -> Result<()>;
}

// ── Transport ────────────────────────────────────────────────────────────────

/// Best-effort delivery of events between windows.
///
/// Nothing is queued for a window that is not open; a send to a closed
/// window is silently dropped.
pub trait MessageBus: Send + Sync {
    fn send_to_window(&self, window_id: &WindowId, event: CrossWindowEvent);
    fn send_to_main(&self, event: CrossWindowEvent);
}

/// Typed request/response channel to one satellite window
#[async_trait]
pub trait SatelliteChannel: Send + Sync {
    async fn request(
        &self,
        window_id: &WindowId,
        request: SatelliteRequest,
    ) -> Result<SatelliteResponse>;
}

// ── Window system ────────────────────────────────────────────────────────────

/// Parameters handed to a satellite when it is created
#[derive(Debug, Clone, PartialEq)]
pub struct SourceWindowParams {
    pub ordinal: u32,
    pub title: String,
    /// Document to focus once the window is up
    pub doc_id: Option<DocId>,
    pub source_position: Option<SourcePosition>,
    /// Snapshot of the main window's document index at creation time
    pub documents: Vec<SourceDocument>,
}

/// Everything needed to open one satellite window
#[derive(Debug, Clone, PartialEq)]
pub struct OpenWindowRequest {
    /// Full window name (`<prefix><window id>`)
    pub name: String,
    pub params: SourceWindowParams,
    pub size: Size,
    pub position: Option<Point>,
}

/// Opening, raising and inspecting top-level windows
pub trait WindowControl: Send + Sync {
    fn open(&self, request: OpenWindowRequest) -> Result<WindowHandle>;

    /// Bring the named satellite to the foreground
    fn activate(&self, name: &str);

    /// Bring the main window to the foreground
    fn focus_main(&self);

    fn is_closed(&self, handle: WindowHandle) -> bool;

    /// Live screen bounds, `None` if the window is gone
    fn geometry(&self, handle: WindowHandle) -> Option<ScreenGeometry>;

    /// Whether the runtime can raise arbitrary top-level windows.
    ///
    /// Desktop hosts can; most browsers cannot. When this is false the
    /// manager moves documents to the window the user is looking at
    /// instead of raising the window that owns them.
    fn can_activate_windows(&self) -> bool;
}

/// Outcome of watching an unloaded window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosureVerdict {
    /// The window is gone for good
    Closed,
    /// The window came back within the grace period
    Reloaded,
}

/// Tells a real close apart from a reload after a window unloads
#[async_trait]
pub trait CloseMonitor: Send + Sync {
    async fn await_closure(&self, name: &str, grace: Duration) -> ClosureVerdict;
}

// ── UI ───────────────────────────────────────────────────────────────────────

/// Modal messages shown to the user
pub trait GlobalDisplay: Send + Sync {
    fn show_error_message(&self, title: &str, message: &str);
}

/// The editor hosted in this window
pub trait LocalEditor: Send + Sync {
    fn current_doc_path(&self) -> Option<String>;
}

/// All collaborators, shared with the manager's background tasks
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn PropertyStore>,
    pub bus: Arc<dyn MessageBus>,
    pub windows: Arc<dyn WindowControl>,
    pub close_monitor: Arc<dyn CloseMonitor>,
    pub geometry: Arc<dyn GeometryPersistence>,
    pub satellites: Arc<dyn SatelliteChannel>,
    pub display: Arc<dyn GlobalDisplay>,
    pub editor: Arc<dyn LocalEditor>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
