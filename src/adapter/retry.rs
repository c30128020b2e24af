//! Startup acquisition loop.
//!
//! Tries to locate the connection a few times shortly after startup so the
//! first persistence call is likely to find it already located. This is a
//! latency optimization only: every call also locates on its own, and the
//! loop stops silently after its last attempt.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::transport::ConnectionLocator;

use super::SyncOptions;

// ============================================================================
// AcquisitionRetryLoop
// ============================================================================

/// Bounded locate schedule: one short delay, then a fixed longer interval.
#[derive(Debug)]
pub struct AcquisitionRetryLoop {
    initial_delay: Duration,
    interval: Duration,
    max_attempts: u32,
    attempts: AtomicU32,
}

impl AcquisitionRetryLoop {
    /// Creates a loop from the adapter options.
    #[must_use]
    pub fn new(options: &SyncOptions) -> Self {
        Self {
            initial_delay: options.initial_acquire_delay,
            interval: options.acquire_interval,
            max_attempts: options.max_acquire_attempts,
            attempts: AtomicU32::new(0),
        }
    }

    /// Returns the number of attempts made so far. Never reset.
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Returns the attempt ceiling.
    #[inline]
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Spawns the loop. It ends early once the locator has a connection
    /// or the locator is dropped.
    pub(crate) fn spawn(self: &Arc<Self>, runtime: &Handle, locator: Weak<ConnectionLocator>) {
        let this = Arc::clone(self);
        runtime.spawn(async move { this.run(locator).await });
    }

    async fn run(&self, locator: Weak<ConnectionLocator>) {
        sleep(self.initial_delay).await;

        loop {
            let Some(strong) = locator.upgrade() else {
                return;
            };
            if strong.is_located() {
                trace!(attempts = self.attempts(), "Acquisition loop done, connection located");
                return;
            }

            let attempts = self.attempts.fetch_add(1, Ordering::AcqRel) + 1;
            let found = strong.locate().is_some();
            trace!(attempts, found, "Acquisition attempt");

            if attempts >= self.max_attempts {
                if !found {
                    debug!(attempts, "Acquisition loop gave up; calls will still locate on demand");
                }
                return;
            }

            drop(strong);
            sleep(self.interval).await;
        }
    }
}
