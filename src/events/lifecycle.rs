//! Per-target lifecycle events.
//!
//! Emitted on a model or collection when a request is dispatched for it,
//! mirroring what the data-binding library's HTTP transport emits.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::model::{CallOptions, TargetRef};
use crate::protocol::InFlight;

// ============================================================================
// Constants
// ============================================================================

/// Channel name for [`TargetEvent::Request`].
pub const REQUEST_EVENT: &str = "request";

// ============================================================================
// RequestEvent
// ============================================================================

/// A request has been sent for a target.
#[derive(Clone)]
pub struct RequestEvent {
    /// Model or collection the request was made for.
    pub target: TargetRef,
    /// Handle for the in-flight request.
    pub handle: InFlight,
    /// Options the call was made with.
    pub options: CallOptions,
}

impl fmt::Debug for RequestEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEvent")
            .field("handle", &self.handle)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TargetEvent
// ============================================================================

/// Lifecycle event delivered to a target.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TargetEvent {
    /// A request was dispatched.
    Request(RequestEvent),
}

impl TargetEvent {
    /// Returns the channel this event is triggered on.
    #[inline]
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Request(_) => REQUEST_EVENT,
        }
    }
}
