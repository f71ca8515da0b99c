//! Opening, closing and restoring satellite windows, plus geometry tracking.

use super::{AfterAssign, Followup, SourceWindowManager};
use crate::document::SourcePosition;
use crate::error::{Result, SourceWindowError};
use crate::geometry::{Point, ScreenGeometry, Size};
use crate::ids::{DocId, WindowId};
use crate::registry::WindowHandle;
use crate::traits::{ClosureVerdict, OpenWindowRequest, SourceWindowParams};
use std::time::Duration;

/// Title of the error shown when the geometry blob cannot be written
const GEOMETRY_FAILED_TITLE: &str = "Can't Save Window Layout";

impl SourceWindowManager {
    /// Open a satellite window for `window_id`.
    ///
    /// Size and ordinal come from persisted geometry when the id has any. A
    /// new id opened at an explicit `position` gets the configured default
    /// size; without one it is tiled off the most recently used satellite.
    /// New ids take the next free ordinal. An explicit `position` always wins.
    pub fn open_window(
        &mut self,
        window_id: WindowId,
        position: Option<Point>,
        doc_id: Option<DocId>,
        source_position: Option<SourcePosition>,
    ) -> Result<WindowHandle> {
        if !self.is_main() {
            return Err(SourceWindowError::NotMainWindow("open_window"));
        }

        let mut size = Size::from(self.config.default_window_size);
        let mut position = position;
        let mut ordinal = None;

        if let Some(saved) = self.geometry.get(&window_id) {
            size = saved.size();
            ordinal = Some(saved.ordinal);
            position = position.or(Some(saved.position()));
        } else if position.is_none()
            && let Some(bounds) = self.most_recent_bounds()
        {
            // tile so the new window doesn't sit exactly on top of the last one
            size = bounds.size();
            position = Some(bounds.position().offset(self.config.tile_offset));
        }

        let ordinal = match ordinal {
            Some(ordinal) => ordinal,
            None => self.geometry.next_ordinal(),
        };

        let name = window_id.window_name(&self.config.window_name_prefix);
        let request = OpenWindowRequest {
            name: name.clone(),
            params: SourceWindowParams {
                ordinal,
                title: format!("{} #{}", self.config.window_title, ordinal),
                doc_id,
                source_position,
                documents: self.documents.snapshot(),
            },
            size,
            position,
        };

        let handle = self
            .collab
            .windows
            .open(request)
            .map_err(|e| SourceWindowError::WindowOpen {
                name,
                message: format!("{e:#}"),
            })?;

        self.mark_focused(&window_id);
        log::info!(
            "Opened source window {} (ordinal {}, {}x{} at {:?})",
            window_id,
            ordinal,
            size.width,
            size.height,
            position
        );
        self.registry.register(window_id, ordinal, handle);
        Ok(handle)
    }

    /// Live bounds of the most recently used satellite, if it is still open
    fn most_recent_bounds(&self) -> Option<ScreenGeometry> {
        if self.most_recent.is_main() {
            return None;
        }
        let entry = self.registry.get(&self.most_recent)?;
        if self.collab.windows.is_closed(entry.handle) {
            return None;
        }
        self.collab.windows.geometry(entry.handle)
    }

    /// Reopen every satellite that owns a document but is not open yet
    pub(super) fn restore_windows(&mut self) {
        let mut owners: Vec<WindowId> = Vec::new();
        for doc in self.documents.documents() {
            let owner = &doc.source_window_id;
            if !owner.is_main() && !owners.contains(owner) {
                owners.push(owner.clone());
            }
        }

        for window_id in owners {
            if self.is_open(&window_id) {
                continue;
            }
            crate::debug_info!("RESTORE", "Reopening satellite {}", window_id);
            if let Err(e) = self.open_window(window_id, None, None, None) {
                log::error!("Failed to restore source window: {}", e);
            }
        }
    }

    /// A satellite was closed by the user.
    ///
    /// Its documents go back to the main window and are closed on the
    /// backend; the window leaves the registry. Does nothing once the
    /// application has started shutting satellites down.
    pub fn close_window(&mut self, window_id: &WindowId) {
        if self.windows_closing {
            crate::debug_info!("CLOSE", "Shutdown in progress; keeping docs of {}", window_id);
            return;
        }

        self.registry.unregister(window_id);
        let owned = self.documents.owned_by(window_id);
        log::info!(
            "Source window {} closed; returning {} documents to main",
            window_id,
            owned.len()
        );
        let main = WindowId::main();
        for doc_id in owned {
            self.assign_owner_then(&doc_id, &main, AfterAssign::CloseDocument);
        }
    }

    /// A window unloaded. Hand it to the close monitor; only a confirmed
    /// close releases its documents.
    pub fn on_satellite_closed(&mut self, name: &str) {
        if self.windows_closing {
            return;
        }
        if !name.starts_with(&self.config.window_name_prefix) {
            return;
        }

        let window_id = WindowId::from_window_name(&self.config.window_name_prefix, name);
        let monitor = self.collab.close_monitor.clone();
        let grace = Duration::from_millis(self.config.close_grace_period_ms);
        let name = name.to_string();
        crate::debug_info!("CLOSE", "Watching {} for {:?}", name, grace);
        self.spawn(async move {
            match monitor.await_closure(&name, grace).await {
                ClosureVerdict::Closed => Some(Followup::WindowClosed(window_id)),
                ClosureVerdict::Reloaded => Some(Followup::WindowReloaded(window_id)),
            }
        });
    }

    /// A window gained focus; only source satellites are tracked
    pub fn on_satellite_focused(&mut self, name: &str) {
        if name.starts_with(&self.config.window_name_prefix) {
            let window_id = WindowId::from_window_name(&self.config.window_name_prefix, name);
            self.mark_focused(&window_id);
        }
    }

    pub fn on_all_satellites_closing(&mut self) {
        log::info!("All satellites closing; suspending document reassignment");
        self.windows_closing = true;
    }

    fn mark_focused(&mut self, window_id: &WindowId) {
        self.last_focused = window_id.clone();
        self.most_recent = window_id.clone();
    }

    /// Last focused satellite, if it is still open
    pub(super) fn last_focused_satellite(&self) -> Option<&WindowId> {
        if self.last_focused.is_main() || !self.is_open(&self.last_focused) {
            return None;
        }
        Some(&self.last_focused)
    }

    /// Raise the satellite that last had focus.
    ///
    /// Always true in a satellite. In the main window, false when windows
    /// cannot be raised or no satellite was focused last, so the caller
    /// handles the request itself.
    pub fn activate_last_focused_source(&self) -> bool {
        if !self.is_main() {
            return true;
        }
        if !self.collab.windows.can_activate_windows() {
            return false;
        }
        match self.last_focused_satellite() {
            Some(window_id) => {
                self.focus_source_window(window_id);
                true
            }
            None => false,
        }
    }

    /// Compare live satellite geometry against what was last persisted and
    /// save it if anything moved.
    ///
    /// Registry entries whose windows have closed are dropped first. Returns
    /// whether a save happened.
    pub async fn refresh_geometry(&mut self) -> Result<bool> {
        let windows = self.collab.windows.clone();
        for stale in self.registry.prune(|handle| windows.is_closed(handle)) {
            crate::debug_log!("GEOMETRY", "Dropped stale window {}", stale);
        }

        let live: Vec<_> = self
            .registry
            .entries()
            .iter()
            .filter_map(|entry| {
                windows
                    .geometry(entry.handle)
                    .map(|bounds| (entry.window_id.clone(), entry.ordinal, bounds))
            })
            .collect();

        if !self.geometry.refresh(live) {
            return Ok(false);
        }

        if let Err(e) = self.collab.geometry.save(self.geometry.geometry()).await {
            let message = format!("{e:#}");
            log::error!("Failed to save source window geometry: {}", message);
            self.collab.display.show_error_message(
                GEOMETRY_FAILED_TITLE,
                &format!("The source window layout could not be saved: \n{message}"),
            );
            return Err(SourceWindowError::GeometryPersistence(message));
        }
        Ok(true)
    }
}
