//! Requests the main window makes of every open satellite, one at a time.

use super::SourceWindowManager;
use crate::error::{Result, SourceWindowError};
use crate::ids::WindowId;
use crate::queue::{QueueReport, SerializedQueue};
use crate::satellite::{SatelliteRequest, UnsavedChangesItem};

impl SourceWindowManager {
    /// Satellites that are registered and still alive, in open order
    fn live_satellites(&self) -> Vec<WindowId> {
        self.registry
            .entries()
            .iter()
            .filter(|entry| !self.collab.windows.is_closed(entry.handle))
            .map(|entry| entry.window_id.clone())
            .collect()
    }

    /// Queue `request` for every live satellite.
    ///
    /// When `raise` is set each satellite is brought forward just before its
    /// turn, so any prompt it shows is visible.
    fn queue_for_all(&self, request: SatelliteRequest, raise: bool) -> SerializedQueue<'static, ()> {
        let mut queue = SerializedQueue::new();
        for window_id in self.live_satellites() {
            let channel = self.collab.satellites.clone();
            let windows = self.collab.windows.clone();
            let name = window_id.window_name(&self.config.window_name_prefix);
            let request = request.clone();
            let label = window_id.as_str().to_string();
            queue.push(label, async move {
                if raise {
                    windows.activate(&name);
                }
                channel.request(&window_id, request).await?.into_done()
            });
        }
        queue
    }

    /// Ask every satellite to save its unsaved documents
    pub async fn save_all_unsaved(&self) -> QueueReport<()> {
        self.queue_for_all(SatelliteRequest::SaveAllUnsaved, false)
            .run()
            .await
    }

    /// Let every satellite save whichever of `items` it owns before exit
    pub async fn handle_unsaved_changes_before_exit(
        &self,
        items: Vec<UnsavedChangesItem>,
    ) -> QueueReport<()> {
        self.queue_for_all(
            SatelliteRequest::HandleUnsavedChangesBeforeExit { items },
            false,
        )
        .run()
        .await
    }

    /// Raise each satellite in turn and have it close all its documents,
    /// then return focus to the main window
    pub async fn close_all_satellite_docs(&self, caption: &str) -> QueueReport<()> {
        let mut queue = self.queue_for_all(
            SatelliteRequest::CloseAllDocs {
                caption: caption.to_string(),
            },
            true,
        );
        let windows = self.collab.windows.clone();
        queue.finally(async move {
            windows.focus_main();
        });
        queue.run().await
    }

    /// Unsaved documents across all satellites.
    ///
    /// A satellite that fails to answer contributes nothing.
    pub async fn get_all_satellite_unsaved_changes(&self) -> Vec<UnsavedChangesItem> {
        let mut queue = SerializedQueue::new();
        for window_id in self.live_satellites() {
            let channel = self.collab.satellites.clone();
            let label = window_id.as_str().to_string();
            queue.push(label, async move {
                channel
                    .request(&window_id, SatelliteRequest::GetUnsavedChanges)
                    .await?
                    .into_unsaved_changes()
            });
        }
        queue
            .run()
            .await
            .outputs
            .into_iter()
            .flat_map(|(_, items)| items)
            .collect()
    }

    /// Raise the satellite owning `item` and have it prompt to save it.
    ///
    /// Completes immediately when no open satellite owns the document.
    pub async fn save_with_prompt(&self, item: UnsavedChangesItem) -> Result<()> {
        let Some(window_id) = self
            .documents
            .find_window_of_id(&item.id)
            .filter(|owner| !owner.is_main() && self.is_open(owner))
        else {
            return Ok(());
        };

        self.focus_source_window(&window_id);
        self.collab
            .satellites
            .request(&window_id, SatelliteRequest::SaveWithPrompt { item })
            .await
            .and_then(|response| response.into_done())
            .map_err(|e| SourceWindowError::satellite(&window_id, format!("{e:#}")))
    }

    /// Path of the document that last had focus, in whichever window
    pub async fn current_doc_path(&self) -> Result<Option<String>> {
        match self.last_focused_satellite() {
            Some(window_id) => self
                .collab
                .satellites
                .request(window_id, SatelliteRequest::GetCurrentDocPath)
                .await
                .and_then(|response| response.into_current_doc_path())
                .map_err(|e| SourceWindowError::satellite(window_id, format!("{e:#}"))),
            None => Ok(self.collab.editor.current_doc_path()),
        }
    }
}
