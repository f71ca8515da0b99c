//! Dispatch of window events to the manager.

use super::{AfterAssign, Followup, SourceWindowManager};
use crate::document::{IndexUpdate, SourceDocument, SourcePosition};
use crate::error::{Result, SourceWindowError};
use crate::events::{CrossWindowEvent, Disposition, WindowEvent};
use crate::geometry::Point;
use crate::ids::{DocId, WindowId};

impl SourceWindowManager {
    /// Handle one event raised in (or delivered to) this window.
    ///
    /// Most document and satellite events only mean something in the main
    /// window and are ignored elsewhere. Events the host editor must also
    /// see come back as [`Disposition::Forward`].
    pub fn handle_event(&mut self, event: WindowEvent) -> Disposition {
        let event = match event {
            WindowEvent::CrossWindow(evt) => return self.handle_cross_window(evt),
            other if !self.is_main() => {
                crate::debug_trace!("EVENT", "Satellite ignores {:?}", other);
                return Disposition::Consumed;
            }
            other => other,
        };

        match event {
            WindowEvent::PopoutDoc {
                doc_id,
                position,
                source_position,
            } => {
                if let Err(e) = self.pop_out(&doc_id, position, source_position) {
                    log::error!("{}", e);
                }
            }
            WindowEvent::SourceDocAdded { doc, window_id } => self.on_source_doc_added(doc, window_id),
            WindowEvent::SourceFileSaved { doc_id, path }
            | WindowEvent::CodeBrowserCreated { doc_id, path } => self.update_doc_path(&doc_id, &path),
            WindowEvent::SatelliteClosed { name } => self.on_satellite_closed(&name),
            WindowEvent::SatelliteFocused { name } => self.on_satellite_focused(&name),
            WindowEvent::AllSatellitesClosing => self.on_all_satellites_closing(),
            WindowEvent::DocTabClosed { doc_id } => self.on_doc_tab_closed(&doc_id),
            WindowEvent::CrossWindow(_) => {}
        }
        Disposition::Consumed
    }

    fn handle_cross_window(&mut self, event: CrossWindowEvent) -> Disposition {
        match event {
            CrossWindowEvent::DocWindowChanged(change) => {
                self.on_owner_changed(change.clone());
                Disposition::Forward(CrossWindowEvent::DocWindowChanged(change))
            }
            CrossWindowEvent::Index(update) => {
                if self.is_main() {
                    log::warn!("Main window ignoring index update {:?}", update);
                } else {
                    self.documents.apply(&update);
                }
                Disposition::Consumed
            }
            evt @ (CrossWindowEvent::DocTabDragStarted { .. }
            | CrossWindowEvent::ApplicationStatus { .. }) => {
                if self.is_main() {
                    self.broadcast(&evt);
                }
                Disposition::Forward(evt)
            }
            evt => Disposition::Forward(evt),
        }
    }

    /// Move a document into a new satellite.
    ///
    /// A fresh window id is generated and the document assigned to it; the
    /// window opens once the assignment has been persisted.
    pub fn pop_out(
        &mut self,
        doc_id: &DocId,
        position: Option<Point>,
        source_position: Option<SourcePosition>,
    ) -> Result<WindowId> {
        if !self.is_main() {
            return Err(SourceWindowError::NotMainWindow("pop_out"));
        }

        let window_id = WindowId::generate();
        log::info!("Popping doc {} out into {}", doc_id, window_id);
        self.assign_owner_then(
            doc_id,
            &window_id,
            AfterAssign::Then(Followup::OpenWindow {
                window_id: window_id.clone(),
                position,
                doc_id: Some(doc_id.clone()),
                source_position,
            }),
        );
        Ok(window_id)
    }

    /// A document was opened in `window_id`, which becomes its owner
    fn on_source_doc_added(&mut self, mut doc: SourceDocument, window_id: WindowId) {
        if self.documents.get(&doc.id).is_some() {
            self.assign_owner(&doc.id, &window_id);
            return;
        }

        let owner_differs = doc.source_window_id != window_id;
        doc.source_window_id = window_id.clone();
        let doc_id = doc.id.clone();
        self.documents.add(doc.clone());
        self.broadcast(&CrossWindowEvent::Index(IndexUpdate::Added(doc)));

        if owner_differs {
            self.persist_owner(doc_id, window_id, AfterAssign::Nothing);
        }
    }

    /// Save, save-as or a new code browser gave a document a path
    fn update_doc_path(&mut self, doc_id: &DocId, path: &str) {
        if self.documents.update_path(doc_id, path) {
            self.broadcast(&CrossWindowEvent::Index(IndexUpdate::PathChanged {
                doc_id: doc_id.clone(),
                path: path.to_string(),
            }));
        }
    }

    fn on_doc_tab_closed(&mut self, doc_id: &DocId) {
        if self.documents.remove(doc_id).is_some() {
            self.broadcast(&CrossWindowEvent::Index(IndexUpdate::Removed {
                doc_id: doc_id.clone(),
            }));
        }
    }
}
