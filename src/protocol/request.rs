//! Transport requests and in-flight handles.
//!
//! A [`TransportRequest`] is the translated form of a persistence call:
//! URL, payload and verb. Dispatching it yields an [`InFlight`] handle, the
//! stand-in for an HTTP request object.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{Map, Value};
use tokio::sync::Notify;

use crate::identifiers::RequestId;

use super::Verb;

// ============================================================================
// TransportRequest
// ============================================================================

/// A request ready to be written to the connection.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Resolved endpoint.
    pub url: String,
    /// Key/value body.
    pub payload: Map<String, Value>,
    /// Transport verb.
    pub verb: Verb,
}

impl TransportRequest {
    /// Creates a new request.
    #[inline]
    #[must_use]
    pub fn new(url: impl Into<String>, payload: Map<String, Value>, verb: Verb) -> Self {
        Self {
            url: url.into(),
            payload,
            verb,
        }
    }
}

// ============================================================================
// InFlight
// ============================================================================

/// Completion flag shared between a handle and its response callback.
#[derive(Default)]
struct Settlement {
    done: AtomicBool,
    notify: Notify,
}

/// Handle for a dispatched request that has not necessarily responded.
///
/// There is no error channel: a request whose connection dropped stays
/// unsettled forever, exactly like one still in flight.
#[derive(Clone)]
pub struct InFlight {
    id: RequestId,
    url: String,
    verb: Verb,
    settlement: Arc<Settlement>,
}

impl InFlight {
    /// Creates an unsettled handle.
    pub(crate) fn new(id: RequestId, url: impl Into<String>, verb: Verb) -> Self {
        Self {
            id,
            url: url.into(),
            verb,
            settlement: Arc::new(Settlement::default()),
        }
    }

    /// Returns the correlation ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the URL the request was sent to.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the verb the request was sent with.
    #[inline]
    #[must_use]
    pub fn verb(&self) -> &Verb {
        &self.verb
    }

    /// Returns `true` once the server has responded.
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settlement.done.load(Ordering::Acquire)
    }

    /// Waits until the server responds.
    ///
    /// Never resolves if the response is lost.
    pub async fn settled(&self) {
        loop {
            let notified = self.settlement.notify.notified();
            if self.is_settled() {
                return;
            }
            notified.await;
        }
    }

    /// Marks the request as answered and wakes waiters.
    pub(crate) fn settle(&self) {
        self.settlement.done.store(true, Ordering::Release);
        self.settlement.notify.notify_waiters();
    }
}

impl fmt::Debug for InFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("verb", &self.verb)
            .field("settled", &self.is_settled())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
