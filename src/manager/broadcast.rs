//! Event fan-out to satellites and ownership-change relaying.

use super::{AfterAssign, Followup, SourceWindowManager};
use crate::events::{CrossWindowEvent, DocWindowChange};
use crate::ids::WindowId;

impl SourceWindowManager {
    /// Whether a satellite is registered and its window is still alive
    pub fn is_open(&self, window_id: &WindowId) -> bool {
        self.registry
            .get(window_id)
            .is_some_and(|entry| !self.collab.windows.is_closed(entry.handle))
    }

    /// Send an event to every open satellite. Closed windows are skipped.
    pub fn broadcast(&self, event: &CrossWindowEvent) {
        for entry in self.registry.entries() {
            if self.collab.windows.is_closed(entry.handle) {
                crate::debug_trace!("BROADCAST", "Skipping closed window {}", entry.window_id);
                continue;
            }
            crate::debug_trace!("BROADCAST", "{} -> {}", event.kind(), entry.window_id);
            self.collab.bus.send_to_window(&entry.window_id, event.clone());
        }
    }

    /// Send an event to one source window, optionally raising it first.
    ///
    /// From a satellite, an empty id addresses the main window.
    pub fn fire_event_to_source_window(
        &self,
        window_id: &WindowId,
        event: CrossWindowEvent,
        focus: bool,
    ) {
        if window_id.is_main() {
            if self.is_main() {
                if focus {
                    self.collab.windows.focus_main();
                }
            } else {
                self.collab.windows.focus_main();
                self.collab.bus.send_to_main(event);
            }
            return;
        }

        if focus {
            self.collab
                .windows
                .activate(&window_id.window_name(&self.config.window_name_prefix));
        }
        if self.is_open(window_id) {
            self.collab.bus.send_to_window(window_id, event);
        } else {
            crate::debug_log!("BROADCAST", "Dropping {} for closed window {}", event.kind(), window_id);
        }
    }

    /// Raise a source window (the main window for an empty id)
    pub fn focus_source_window(&self, window_id: &WindowId) {
        if window_id.is_main() {
            self.collab.windows.focus_main();
        } else {
            self.collab
                .windows
                .activate(&window_id.window_name(&self.config.window_name_prefix));
        }
    }

    /// React to a document changing windows.
    ///
    /// If the document is moving here, it is assigned before the change is
    /// relayed so the index is current by the time peers hear about it. The
    /// main window records every other move authoritatively; a satellite
    /// only updates its snapshot.
    pub fn on_owner_changed(&mut self, change: DocWindowChange) {
        if change.new_window_id == self.window_id {
            let doc_id = change.doc_id.clone();
            let new_owner = change.new_window_id.clone();
            self.assign_owner_then(
                &doc_id,
                &new_owner,
                AfterAssign::Then(Followup::BroadcastOwnerChange(change)),
            );
        } else if self.is_main() {
            self.assign_owner(&change.doc_id, &change.new_window_id);
            self.broadcast_owner_change(&change);
        } else {
            self.documents
                .set_owner(&change.doc_id, &change.new_window_id);
            self.broadcast_owner_change(&change);
        }
    }

    /// Relay an ownership change to whoever still needs to hear about it.
    ///
    /// The main window tells the window that lost the document and raises the
    /// one that gained it. A satellite that gained a document tells the main
    /// window.
    pub(super) fn broadcast_owner_change(&self, change: &DocWindowChange) {
        if self.is_main() && change.old_window_id != self.window_id {
            self.fire_event_to_source_window(
                &change.old_window_id,
                CrossWindowEvent::DocWindowChanged(change.clone()),
                false,
            );
            self.focus_source_window(&change.new_window_id);
        } else if change.new_window_id == self.window_id {
            self.collab
                .bus
                .send_to_main(CrossWindowEvent::DocWindowChanged(change.clone()));
        }
    }
}
