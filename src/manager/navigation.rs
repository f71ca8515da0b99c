//! Routing navigation requests to the window that owns the target document.

use super::SourceWindowManager;
use crate::document::SourcePosition;
use crate::events::CrossWindowEvent;
use crate::ids::{DocId, WindowId};

/// Outcome of a routing attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    /// No window has the document; the caller should open it itself
    None,
    /// The document was moved to this window; the caller should show it
    Relocate(DocId),
    /// The owning window was told to navigate
    Navigated,
}

impl SourceWindowManager {
    /// Route a navigation request for `path`.
    ///
    /// When the owning window is a different one, either the event is
    /// forwarded there (if the runtime can raise windows) or the document is
    /// stolen into this window. Documents already in this window, and paths
    /// no window has open, yield [`NavigationResult::None`].
    pub fn navigate(
        &mut self,
        path: &str,
        event: CrossWindowEvent,
        focus: bool,
    ) -> NavigationResult {
        let owner = self.documents.find_window_of(path);
        crate::debug_log!(
            "NAV",
            "{} in {}: owner={:?} focus={}",
            event.kind(),
            self.window_id,
            owner,
            focus
        );

        if self.is_main() {
            match owner {
                Some(owner) if !owner.is_main() && self.is_open(&owner) => {
                    self.route_from_main(path, owner, event, focus)
                }
                _ => NavigationResult::None,
            }
        } else {
            match owner {
                Some(owner) if owner != self.window_id => self.route_from_satellite(path, owner, event),
                _ => NavigationResult::None,
            }
        }
    }

    /// Navigate to a file, focusing its window
    pub fn navigate_to_file(
        &mut self,
        path: &str,
        position: Option<SourcePosition>,
        focus: bool,
    ) -> NavigationResult {
        let event = CrossWindowEvent::OpenSourceFile {
            path: path.to_string(),
            position,
        };
        self.navigate(path, event, focus)
    }

    /// Route a code browser event. Only navigation events raise the target window.
    pub fn navigate_to_code_browser(
        &mut self,
        path: &str,
        event: CrossWindowEvent,
    ) -> NavigationResult {
        let focus = matches!(event, CrossWindowEvent::CodeBrowserNavigation { .. });
        self.navigate(path, event, focus)
    }

    fn route_from_main(
        &mut self,
        path: &str,
        owner: WindowId,
        event: CrossWindowEvent,
        focus: bool,
    ) -> NavigationResult {
        if self.collab.windows.can_activate_windows() {
            self.fire_event_to_source_window(&owner, event, focus);
            return NavigationResult::Navigated;
        }

        // Can't raise the satellite: take the tab into the main window and
        // tell the satellite to drop it
        let Some(doc_id) = self.documents.find_by_path(path).map(|d| d.id.clone()) else {
            return NavigationResult::None;
        };
        let here = self.window_id.clone();
        self.assign_owner(&doc_id, &here);
        self.fire_event_to_source_window(
            &owner,
            CrossWindowEvent::doc_window_changed(doc_id.clone(), owner.clone(), here),
            true,
        );
        log::info!("Moved doc {} from {} into the main window", doc_id, owner);
        NavigationResult::Relocate(doc_id)
    }

    fn route_from_satellite(
        &mut self,
        path: &str,
        owner: WindowId,
        event: CrossWindowEvent,
    ) -> NavigationResult {
        if self.collab.windows.can_activate_windows() {
            // let the main window re-route it
            self.collab.bus.send_to_main(event);
            if owner.is_main() {
                self.collab.windows.focus_main();
            }
            return NavigationResult::Navigated;
        }

        let Some(doc_id) = self.documents.find_by_path(path).map(|d| d.id.clone()) else {
            return NavigationResult::None;
        };
        let here = self.window_id.clone();
        self.assign_owner(&doc_id, &here);
        self.collab.bus.send_to_main(CrossWindowEvent::doc_window_changed(
            doc_id.clone(),
            owner.clone(),
            here,
        ));
        log::info!("Moved doc {} from {} into satellite {}", doc_id, owner, self.window_id);
        NavigationResult::Relocate(doc_id)
    }
}
