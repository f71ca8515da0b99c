//! Shared integration test helpers for par-source-windows.
//!
//! Every external collaborator of the manager has a recording fake here so
//! tests can assert exactly which messages, writes and window operations a
//! call produced.
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{Harness, doc};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a
//! subset of helpers are used per test binary.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use parking_lot::Mutex;
use par_source_windows::config::Config;
use par_source_windows::geometry::{GeometryMap, ScreenGeometry};
use par_source_windows::registry::WindowHandle;
use par_source_windows::satellite::{
    LocalSatelliteChannel, SatelliteRequestHandler, UnsavedChangesItem,
};
use par_source_windows::traits::{
    CloseMonitor, ClosureVerdict, Collaborators, GeometryPersistence, GlobalDisplay, LocalEditor,
    MessageBus, OpenWindowRequest, PropertyStore, WindowControl,
};
use par_source_windows::{
    CrossWindowEvent, DocId, SourceDocument, SourceWindowManager, WindowId,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

pub const PREFIX: &str = "_rstudio_satellite_source_window_";

/// Build a document with an owner ("" for the main window)
pub fn doc(id: &str, path: Option<&str>, owner: &str) -> SourceDocument {
    SourceDocument::new(id, path.map(str::to_string)).with_owner(WindowId::from(owner))
}

pub fn bounds(x: i32, y: i32, width: u32, height: u32) -> ScreenGeometry {
    ScreenGeometry {
        x,
        y,
        width,
        height,
    }
}

// ── Message bus ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Window(WindowId),
    Main,
}

#[derive(Default)]
pub struct RecordingBus {
    sent: Mutex<Vec<(Target, CrossWindowEvent)>>,
}

impl RecordingBus {
    pub fn all(&self) -> Vec<(Target, CrossWindowEvent)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, window_id: &str) -> Vec<CrossWindowEvent> {
        let target = Target::Window(WindowId::from(window_id));
        self.sent
            .lock()
            .iter()
            .filter(|(t, _)| *t == target)
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn sent_to_main(&self) -> Vec<CrossWindowEvent> {
        self.sent
            .lock()
            .iter()
            .filter(|(t, _)| *t == Target::Main)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Events sent anywhere, ignoring index snapshot refreshes
    pub fn non_index(&self) -> Vec<(Target, CrossWindowEvent)> {
        self.sent
            .lock()
            .iter()
            .filter(|(_, e)| !matches!(e, CrossWindowEvent::Index(_)))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

impl MessageBus for RecordingBus {
    fn send_to_window(&self, window_id: &WindowId, event: CrossWindowEvent) {
        self.sent.lock().push((Target::Window(window_id.clone()), event));
    }

    fn send_to_main(&self, event: CrossWindowEvent) {
        self.sent.lock().push((Target::Main, event));
    }
}

// ── Property store ───────────────────────────────────────────────────────────

pub struct RecordingStore {
    modified: Mutex<Vec<(DocId, HashMap<String, String>)>>,
    closed: Mutex<Vec<DocId>>,
    fail: AtomicBool,
    gate: watch::Sender<bool>,
}

impl Default for RecordingStore {
    fn default() -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            modified: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            gate,
        }
    }
}

impl RecordingStore {
    /// `(doc id, owner written)` for every ownership write, in call order
    pub fn owner_writes(&self) -> Vec<(String, String)> {
        self.modified
            .lock()
            .iter()
            .map(|(id, props)| {
                (
                    id.as_str().to_string(),
                    props.get("source_window_id").cloned().unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn closed(&self) -> Vec<String> {
        self.closed
            .lock()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make writes wait until [`RecordingStore::release`] is called
    pub fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
    }
}

#[async_trait]
impl PropertyStore for RecordingStore {
    async fn modify_document_properties(
        &self,
        doc_id: &DocId,
        properties: HashMap<String, String>,
    ) -> Result<()> {
        self.modified.lock().push((doc_id.clone(), properties));
        let mut gate = self.gate.subscribe();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| anyhow!("store gate dropped"))?;
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("server unavailable"));
        }
        Ok(())
    }

    async fn close_document(&self, doc_id: &DocId) -> Result<()> {
        self.closed.lock().push(doc_id.clone());
        Ok(())
    }
}

// ── Window system ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub name: String,
    pub closed: bool,
    pub bounds: ScreenGeometry,
}

pub struct FakeWindowControl {
    pub opened: Mutex<Vec<OpenWindowRequest>>,
    windows: Mutex<HashMap<u64, FakeWindow>>,
    next_handle: AtomicU64,
    can_activate: AtomicBool,
    fail_open: AtomicBool,
    pub activated: Mutex<Vec<String>>,
    main_focused: AtomicUsize,
}

impl Default for FakeWindowControl {
    fn default() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            windows: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
            can_activate: AtomicBool::new(true),
            fail_open: AtomicBool::new(false),
            activated: Mutex::new(Vec::new()),
            main_focused: AtomicUsize::new(0),
        }
    }
}

impl FakeWindowControl {
    pub fn set_can_activate(&self, can: bool) {
        self.can_activate.store(can, Ordering::SeqCst);
    }

    pub fn set_fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn opened_names(&self) -> Vec<String> {
        self.opened.lock().iter().map(|r| r.name.clone()).collect()
    }

    pub fn last_opened(&self) -> Option<OpenWindowRequest> {
        self.opened.lock().last().cloned()
    }

    pub fn activated(&self) -> Vec<String> {
        self.activated.lock().clone()
    }

    pub fn main_focus_count(&self) -> usize {
        self.main_focused.load(Ordering::SeqCst)
    }

    fn find(&self, name: &str) -> Option<u64> {
        self.windows
            .lock()
            .iter()
            .find(|(_, w)| w.name == name && !w.closed)
            .map(|(h, _)| *h)
    }

    /// Close the live window with this satellite id
    pub fn close(&self, window_id: &str) {
        let name = format!("{PREFIX}{window_id}");
        if let Some(handle) = self.find(&name) {
            if let Some(w) = self.windows.lock().get_mut(&handle) {
                w.closed = true;
            }
        }
    }

    /// Move or resize the live window with this satellite id
    pub fn set_bounds(&self, window_id: &str, bounds: ScreenGeometry) {
        let name = format!("{PREFIX}{window_id}");
        if let Some(handle) = self.find(&name) {
            if let Some(w) = self.windows.lock().get_mut(&handle) {
                w.bounds = bounds;
            }
        }
    }

    pub fn bounds_of(&self, window_id: &str) -> Option<ScreenGeometry> {
        let name = format!("{PREFIX}{window_id}");
        let handle = self.find(&name)?;
        self.windows.lock().get(&handle).map(|w| w.bounds)
    }
}

impl WindowControl for FakeWindowControl {
    fn open(&self, request: OpenWindowRequest) -> Result<WindowHandle> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(anyhow!("popup blocked"));
        }
        let handle = self.next_handle.fetch_add(1, Ordering::SeqCst);
        let position = request.position.unwrap_or_default();
        self.windows.lock().insert(
            handle,
            FakeWindow {
                name: request.name.clone(),
                closed: false,
                bounds: bounds(
                    position.x,
                    position.y,
                    request.size.width,
                    request.size.height,
                ),
            },
        );
        self.opened.lock().push(request);
        Ok(WindowHandle(handle))
    }

    fn activate(&self, name: &str) {
        self.activated.lock().push(name.to_string());
    }

    fn focus_main(&self) {
        self.main_focused.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self, handle: WindowHandle) -> bool {
        self.windows
            .lock()
            .get(&handle.0)
            .is_none_or(|w| w.closed)
    }

    fn geometry(&self, handle: WindowHandle) -> Option<ScreenGeometry> {
        self.windows
            .lock()
            .get(&handle.0)
            .filter(|w| !w.closed)
            .map(|w| w.bounds)
    }

    fn can_activate_windows(&self) -> bool {
        self.can_activate.load(Ordering::SeqCst)
    }
}

// ── Close monitor ────────────────────────────────────────────────────────────

pub struct InstantCloseMonitor {
    verdict: Mutex<ClosureVerdict>,
    pub watched: Mutex<Vec<(String, Duration)>>,
}

impl Default for InstantCloseMonitor {
    fn default() -> Self {
        Self {
            verdict: Mutex::new(ClosureVerdict::Closed),
            watched: Mutex::new(Vec::new()),
        }
    }
}

impl InstantCloseMonitor {
    pub fn set_verdict(&self, verdict: ClosureVerdict) {
        *self.verdict.lock() = verdict;
    }
}

#[async_trait]
impl CloseMonitor for InstantCloseMonitor {
    async fn await_closure(&self, name: &str, grace: Duration) -> ClosureVerdict {
        self.watched.lock().push((name.to_string(), grace));
        *self.verdict.lock()
    }
}

// ── Geometry persistence ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryGeometry {
    pub stored: Mutex<GeometryMap>,
    saves: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryGeometry {
    pub fn with(map: GeometryMap) -> Self {
        Self {
            stored: Mutex::new(map),
            ..Default::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl GeometryPersistence for MemoryGeometry {
    async fn load(&self) -> Result<GeometryMap> {
        Ok(self.stored.lock().clone())
    }

    async fn save(&self, geometry: &GeometryMap) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("client state quota exceeded"));
        }
        *self.stored.lock() = geometry.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ── UI ───────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub errors: Mutex<Vec<(String, String)>>,
}

impl GlobalDisplay for RecordingDisplay {
    fn show_error_message(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .push((title.to_string(), message.to_string()));
    }
}

#[derive(Default)]
pub struct FakeEditor {
    pub path: Mutex<Option<String>>,
}

impl LocalEditor for FakeEditor {
    fn current_doc_path(&self) -> Option<String> {
        self.path.lock().clone()
    }
}

// ── Satellites ───────────────────────────────────────────────────────────────

/// Satellite handler that logs every request into a shared journal
pub struct ScriptedSatellite {
    pub window_id: String,
    pub journal: Arc<Mutex<Vec<String>>>,
    pub unsaved: Vec<UnsavedChangesItem>,
    pub current_path: Option<String>,
    pub fail: bool,
}

impl ScriptedSatellite {
    fn record(&self, what: &str) -> Result<()> {
        self.journal
            .lock()
            .push(format!("{}:{}", self.window_id, what));
        if self.fail {
            return Err(anyhow!("satellite {} is not responding", self.window_id));
        }
        Ok(())
    }
}

#[async_trait]
impl SatelliteRequestHandler for ScriptedSatellite {
    async fn save_all_unsaved(&mut self) -> Result<()> {
        // yield so a non-serialized caller would interleave
        tokio::task::yield_now().await;
        self.record("save_all")
    }

    async fn close_all_docs(&mut self, caption: &str) -> Result<()> {
        self.record(&format!("close_all({caption})"))
    }

    async fn unsaved_changes(&mut self) -> Result<Vec<UnsavedChangesItem>> {
        self.record("unsaved")?;
        Ok(self.unsaved.clone())
    }

    async fn current_doc_path(&mut self) -> Result<Option<String>> {
        self.record("current_path")?;
        Ok(self.current_path.clone())
    }

    async fn handle_unsaved_changes_before_exit(
        &mut self,
        items: &[UnsavedChangesItem],
    ) -> Result<()> {
        self.record(&format!("before_exit({})", items.len()))
    }

    async fn save_with_prompt(&mut self, item: &UnsavedChangesItem) -> Result<()> {
        self.record(&format!("save_with_prompt({})", item.id))
    }
}

// ── Harness ──────────────────────────────────────────────────────────────────

/// All fakes for one window, plus helpers to build managers on top of them
#[derive(Default)]
pub struct Harness {
    pub bus: Arc<RecordingBus>,
    pub store: Arc<RecordingStore>,
    pub windows: Arc<FakeWindowControl>,
    pub monitor: Arc<InstantCloseMonitor>,
    pub geometry: Arc<MemoryGeometry>,
    pub display: Arc<RecordingDisplay>,
    pub editor: Arc<FakeEditor>,
    pub satellites: LocalSatelliteChannel,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(map: GeometryMap) -> Self {
        Self {
            geometry: Arc::new(MemoryGeometry::with(map)),
            ..Default::default()
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            store: self.store.clone(),
            bus: self.bus.clone(),
            windows: self.windows.clone(),
            close_monitor: self.monitor.clone(),
            geometry: self.geometry.clone(),
            satellites: Arc::new(self.satellites.clone()),
            display: self.display.clone(),
            editor: self.editor.clone(),
        }
    }

    /// Main window manager over `docs`, with default config
    pub async fn main(&self, docs: Vec<SourceDocument>) -> SourceWindowManager {
        SourceWindowManager::new_main(Config::default(), self.collaborators(), docs).await
    }

    /// Satellite manager as if opened with the given snapshot
    pub fn satellite(
        &self,
        window_id: &str,
        docs: Vec<SourceDocument>,
    ) -> SourceWindowManager {
        let params = par_source_windows::traits::SourceWindowParams {
            ordinal: 1,
            title: "Source #1".to_string(),
            doc_id: None,
            source_position: None,
            documents: docs,
        };
        SourceWindowManager::new_satellite(
            Config::default(),
            self.collaborators(),
            WindowId::from(window_id),
            params,
        )
    }

    /// Register a scripted handler for a satellite
    pub fn script_satellite(
        &self,
        window_id: &str,
        journal: &Arc<Mutex<Vec<String>>>,
        configure: impl FnOnce(&mut ScriptedSatellite),
    ) {
        let mut satellite = ScriptedSatellite {
            window_id: window_id.to_string(),
            journal: Arc::clone(journal),
            unsaved: Vec::new(),
            current_path: None,
            fail: false,
        };
        configure(&mut satellite);
        self.satellites
            .register(WindowId::from(window_id), Box::new(satellite));
    }
}
