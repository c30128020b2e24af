//! Readiness poller.
//!
//! Runs while calls are queued. Each tick checks connection health; once
//! healthy it replays the queue in submission order and stops. Unbounded
//! unless `max_poll_ticks` is set.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::debug;

use super::SyncOptions;
use super::core::{AdapterInner, Drain};

// ============================================================================
// ReadyPoller
// ============================================================================

/// Fixed-interval health poller that drains the queue.
#[derive(Debug, Clone, Copy)]
pub struct ReadyPoller {
    interval: Duration,
    max_ticks: Option<u32>,
}

impl ReadyPoller {
    /// Creates a poller from the adapter options.
    #[must_use]
    pub fn new(options: &SyncOptions) -> Self {
        Self {
            interval: options.poll_interval,
            max_ticks: options.max_poll_ticks,
        }
    }

    /// Spawns a polling task for `adapter`.
    ///
    /// Callers start at most one at a time; the queue tracks whether one
    /// is running.
    pub(crate) fn spawn(self, runtime: &Handle, adapter: Weak<AdapterInner>) {
        runtime.spawn(self.run(adapter));
    }

    async fn run(self, adapter: Weak<AdapterInner>) {
        let mut ticks: u32 = 0;

        loop {
            sleep(self.interval).await;

            let Some(inner) = adapter.upgrade() else {
                return;
            };
            ticks = ticks.saturating_add(1);

            if inner.drain_queue() == Drain::Complete {
                debug!(ticks, "Request queue drained");
                return;
            }

            if let Some(max_ticks) = self.max_ticks
                && ticks >= max_ticks
            {
                inner.abandon_queue(ticks);
                return;
            }
        }
    }
}
