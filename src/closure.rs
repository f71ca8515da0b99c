//! Close-vs-reload disambiguation for unloaded satellite windows.
//!
//! An unload event fires both when the user closes a satellite and when the
//! satellite merely reloads. [`GracePeriodCloseMonitor`] polls a presence
//! probe for the window name; if the window re-announces itself within the
//! grace period it was a reload, otherwise it is treated as closed.

use crate::traits::{CloseMonitor, ClosureVerdict};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default interval between presence checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Returns true while a window with the given name is present
pub type PresenceProbe = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub struct GracePeriodCloseMonitor {
    probe: PresenceProbe,
    poll_interval: Duration,
}

impl GracePeriodCloseMonitor {
    pub fn new(probe: PresenceProbe) -> Self {
        Self {
            probe,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl std::fmt::Debug for GracePeriodCloseMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GracePeriodCloseMonitor")
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CloseMonitor for GracePeriodCloseMonitor {
    async fn await_closure(&self, name: &str, grace: Duration) -> ClosureVerdict {
        let deadline = Instant::now() + grace;
        loop {
            let now = Instant::now();
            if now >= deadline {
                crate::debug_info!("CLOSE", "{} did not come back within {:?}", name, grace);
                return ClosureVerdict::Closed;
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
            if (self.probe)(name) {
                crate::debug_info!("CLOSE", "{} reloaded", name);
                return ClosureVerdict::Reloaded;
            }
        }
    }
}
