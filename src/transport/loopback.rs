//! In-process connection.
//!
//! [`LoopbackConnection`] answers requests with a responder closure instead
//! of a server. Its `connected` flag is set by hand, which makes it the
//! substitute connection for tests and for embedding a server in-process.
//!
//! Responses are delivered from a spawned task when a tokio runtime is
//! available, and inline otherwise.
//!
//! # Example
//!
//! ```
//! use socket_sync::LoopbackConnection;
//! use serde_json::json;
//!
//! let connection = LoopbackConnection::new()
//!     .with_responder(|request| json!({ "echo": request.url }));
//! connection.set_connected(true);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::TransportRequest;

use super::{Connection, MessageHandler, ResponseCallback};

// ============================================================================
// Types
// ============================================================================

/// Produces the response body for a request.
pub type Responder = Arc<dyn Fn(&TransportRequest) -> Value + Send + Sync>;

/// Shared state behind every clone.
#[derive(Default)]
struct LoopbackInner {
    connected: AtomicBool,
    handlers: RwLock<FxHashMap<String, Vec<MessageHandler>>>,
    responder: RwLock<Option<Responder>>,
    sent: Mutex<Vec<(RequestId, TransportRequest)>>,
}

// ============================================================================
// LoopbackConnection
// ============================================================================

/// A connection served by a closure in the same process.
///
/// Clones share state. Without a responder, requests are recorded and never
/// answered.
#[derive(Clone, Default)]
pub struct LoopbackConnection {
    inner: Arc<LoopbackInner>,
}

impl LoopbackConnection {
    /// Creates a disconnected loopback with no responder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the responder.
    #[must_use]
    pub fn with_responder(
        self,
        responder: impl Fn(&TransportRequest) -> Value + Send + Sync + 'static,
    ) -> Self {
        *self.inner.responder.write() = Some(Arc::new(responder));
        self
    }

    /// Opens or closes the simulated socket.
    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::Release);
    }

    /// Delivers a push message to handlers of `event`.
    ///
    /// Returns the number of handlers invoked.
    pub fn push(&self, event: &str, data: Value) -> usize {
        let snapshot: Vec<MessageHandler> = self
            .inner
            .handlers
            .read()
            .get(event)
            .cloned()
            .unwrap_or_default();

        for handler in &snapshot {
            handler(&data);
        }
        snapshot.len()
    }

    /// Returns the requests sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<TransportRequest> {
        self.inner
            .sent
            .lock()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Returns the number of handlers subscribed to `event`.
    #[must_use]
    pub fn handler_count(&self, event: &str) -> usize {
        self.inner.handlers.read().get(event).map_or(0, Vec::len)
    }
}

// ============================================================================
// Connection
// ============================================================================

impl Connection for LoopbackConnection {
    fn on(&self, event: &str, handler: MessageHandler) {
        self.inner
            .handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    fn request(
        &self,
        id: RequestId,
        request: TransportRequest,
        callback: ResponseCallback,
    ) -> Result<()> {
        if !self.is_connected() {
            return Err(Error::ConnectionClosed);
        }

        trace!(%id, verb = %request.verb, url = %request.url, "Loopback request");
        self.inner.sent.lock().push((id, request.clone()));

        let Some(responder) = self.inner.responder.read().clone() else {
            return Ok(());
        };

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let body = responder(&request);
                    callback(body);
                });
            }
            Err(_) => callback(responder(&request)),
        }

        Ok(())
    }
}

impl fmt::Debug for LoopbackConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoopbackConnection")
            .field("connected", &self.is_connected())
            .field("sent", &self.inner.sent.lock().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
