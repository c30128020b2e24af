//! Ordered buffer of calls waiting for the connection.
//!
//! The queue and the poller's running flag live under one lock, so a call
//! enqueued while the poller is finishing its last drain either lands in
//! that drain or starts a new poller. It is never stranded.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::model::{CallOptions, TargetRef};
use crate::protocol::SyncMethod;

// ============================================================================
// PendingCall
// ============================================================================

/// A persistence call held until the connection opens.
#[derive(Clone)]
pub struct PendingCall {
    /// Requested operation.
    pub method: SyncMethod,
    /// Model or collection.
    pub target: TargetRef,
    /// The adapter's copy of the call options.
    pub options: CallOptions,
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("method", &self.method)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RequestQueue
// ============================================================================

#[derive(Default)]
struct QueueState {
    calls: VecDeque<PendingCall>,
    polling: bool,
}

/// FIFO queue of pending calls.
#[derive(Default)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
}

impl RequestQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call.
    ///
    /// Returns `true` if no poller was running and the caller must start one.
    #[must_use]
    pub fn enqueue(&self, call: PendingCall) -> bool {
        let mut state = self.state.lock();
        state.calls.push_back(call);
        !std::mem::replace(&mut state.polling, true)
    }

    /// Appends a call only if earlier calls are queued or still replaying.
    ///
    /// A drain keeps `polling` set until the call it popped last has been
    /// dispatched, so a call that finds the queue empty mid-replay is still
    /// held back. Returns `Ok(start_poller)` when queued and gives the call
    /// back as `Err` when the queue is idle.
    pub fn enqueue_if_busy(&self, call: PendingCall) -> Result<bool, PendingCall> {
        let mut state = self.state.lock();
        if !state.polling && state.calls.is_empty() {
            return Err(call);
        }
        state.calls.push_back(call);
        Ok(!std::mem::replace(&mut state.polling, true))
    }

    /// Takes the oldest call.
    ///
    /// When the queue is empty the poller is marked stopped and `None` is
    /// returned.
    pub fn next_or_idle(&self) -> Option<PendingCall> {
        let mut state = self.state.lock();
        let next = state.calls.pop_front();
        if next.is_none() {
            state.polling = false;
        }
        next
    }

    /// Puts a call back at the head after a failed send.
    pub fn requeue_front(&self, call: PendingCall) {
        self.state.lock().calls.push_front(call);
    }

    /// Removes every call and marks the poller stopped.
    pub fn abandon(&self) -> Vec<PendingCall> {
        let mut state = self.state.lock();
        state.polling = false;
        state.calls.drain(..).collect()
    }

    /// Returns the number of queued calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().calls.is_empty()
    }

    /// Returns `true` if a poller is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.state.lock().polling
    }
}

impl fmt::Debug for RequestQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RequestQueue")
            .field("len", &state.calls.len())
            .field("polling", &state.polling)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
