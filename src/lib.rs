// Library exports for hosts embedding the source-window coordinator and for tests
//
// # Mutex Usage Policy
//
// Each window's manager is driven from a single event loop and owns its state
// outright; there is no shared mutable state between windows. Locks only
// appear at the edges:
//
//   - `parking_lot::Mutex`: sync-only state such as the debug log file and
//                           the in-process satellite handler table. Never
//                           held across an `.await`.
//
//   - `tokio::sync::Mutex`: per-satellite request handlers, which are held
//                           across `.await` while a request (possibly a
//                           user prompt) is in progress.

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod closure;
pub mod config {
    //! Configuration re-exports from the `par-source-windows-config` crate.
    pub use par_source_windows_config::*;
}
pub mod document;
pub mod error;
pub mod events;
pub mod geometry;
pub mod ids;
pub mod manager;
pub mod queue;
pub mod registry;
pub mod satellite;
pub mod traits;

pub use document::{DocumentIndex, IndexUpdate, SourceDocument, SourcePosition};
pub use error::SourceWindowError;
pub use events::{CrossWindowEvent, Disposition, DocWindowChange, WindowEvent};
pub use ids::{DocId, WindowId};
pub use manager::{NavigationResult, SourceWindowManager};
