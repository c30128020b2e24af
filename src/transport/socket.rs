//! WebSocket connection and event loop.
//!
//! [`SocketConnection::open`] returns at once and connects in the
//! background, so the connection can be published before it is usable.
//! `is_connected` turns `true` after the WebSocket handshake and back to
//! `false` when the socket closes. There is no reconnection.
//!
//! # Event Loop
//!
//! The connection spawns a tokio task that handles:
//!
//! - Outgoing request frames
//! - Response correlation by request ID
//! - Push messages routed to `on(event, ..)` handlers

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::{Value, from_str, to_string};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::{InboundFrame, RequestFrame, TransportRequest};

use super::{Connection, MessageHandler, ResponseCallback};

// ============================================================================
// Types
// ============================================================================

/// Client WebSocket stream.
type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map of request IDs to response callbacks.
type CorrelationMap = FxHashMap<RequestId, ResponseCallback>;

/// Inbound event handlers by event name.
type HandlerMap = FxHashMap<String, Vec<MessageHandler>>;

/// State shared between the handle and the event loop.
#[derive(Default)]
struct SocketState {
    connected: AtomicBool,
    correlation: Mutex<CorrelationMap>,
    handlers: RwLock<HandlerMap>,
}

// ============================================================================
// SocketCommand
// ============================================================================

/// Internal commands for the event loop.
enum SocketCommand {
    /// Write a serialized request and await its response.
    Send {
        id: RequestId,
        text: String,
        callback: ResponseCallback,
    },
    /// Close the socket.
    Shutdown,
}

// ============================================================================
// SocketConnection
// ============================================================================

/// WebSocket client connection.
///
/// `SocketConnection` is `Send + Sync` and cheap to clone; clones share the
/// same socket.
#[derive(Clone)]
pub struct SocketConnection {
    /// WebSocket URL.
    url: Url,
    /// Channel for sending commands to the event loop.
    command_tx: mpsc::UnboundedSender<SocketCommand>,
    /// State shared with the event loop.
    state: Arc<SocketState>,
}

impl SocketConnection {
    /// Starts connecting to `url` in the background.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the URL is invalid, not `ws`/`wss`, or no
    ///   tokio runtime is running
    pub fn open(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| Error::config(format!("Invalid socket URL {url}: {e}")))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "Socket URL must use ws:// or wss://, got {}://",
                url.scheme()
            )));
        }

        let runtime = Handle::try_current()
            .map_err(|_| Error::config("SocketConnection::open must be called inside a tokio runtime"))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = Arc::new(SocketState::default());

        runtime.spawn(Self::run_event_loop(
            url.clone(),
            command_rx,
            Arc::clone(&state),
        ));

        Ok(Self {
            url,
            command_tx,
            state,
        })
    }

    /// Returns the WebSocket URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the number of requests awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.correlation.lock().len()
    }

    /// Closes the socket.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(SocketCommand::Shutdown);
    }

    /// Event loop that handles WebSocket I/O.
    async fn run_event_loop(
        url: Url,
        mut command_rx: mpsc::UnboundedReceiver<SocketCommand>,
        state: Arc<SocketState>,
    ) {
        let ws_stream = match Self::connect(&url).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(url = %url, error = %e, "WebSocket connect failed");
                return;
            }
        };

        state.connected.store(true, Ordering::Release);
        info!(url = %url, "WebSocket connected");

        let (mut ws_write, mut ws_read) = ws_stream.split();

        loop {
            tokio::select! {
                message = ws_read.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => {
                            Self::handle_incoming_message(&text, &state);
                        }

                        Some(Ok(Message::Close(_))) => {
                            debug!("WebSocket closed by remote");
                            break;
                        }

                        Some(Err(e)) => {
                            error!(error = %e, "WebSocket error");
                            break;
                        }

                        None => {
                            debug!("WebSocket stream ended");
                            break;
                        }

                        // Ignore Binary, Ping, Pong
                        _ => {}
                    }
                }

                command = command_rx.recv() => {
                    match command {
                        Some(SocketCommand::Send { id, text, callback }) => {
                            state.correlation.lock().insert(id, callback);

                            if let Err(e) = ws_write.send(Message::Text(text.into())).await {
                                state.correlation.lock().remove(&id);
                                warn!(%id, error = %e, "Failed to write request");
                            } else {
                                trace!(%id, "Request sent");
                            }
                        }

                        Some(SocketCommand::Shutdown) => {
                            debug!("Shutdown command received");
                            let _ = ws_write.close().await;
                            break;
                        }

                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }
            }
        }

        state.connected.store(false, Ordering::Release);
        Self::drop_pending_requests(&state);
        debug!("Event loop terminated");
    }

    /// Performs the WebSocket handshake.
    async fn connect(url: &Url) -> Result<WsStream> {
        let (stream, _) = connect_async(url.as_str()).await?;
        Ok(stream)
    }

    /// Parses a text frame as a response or push.
    fn parse_frame(text: &str) -> Result<InboundFrame> {
        from_str::<InboundFrame>(text)
            .map_err(|e| Error::protocol(format!("Unrecognized frame: {e}")))
    }

    /// Routes an incoming text frame.
    fn handle_incoming_message(text: &str, state: &SocketState) {
        match Self::parse_frame(text) {
            Ok(InboundFrame::Response { id, body }) => {
                let callback = state.correlation.lock().remove(&id);
                match callback {
                    Some(callback) => callback(body),
                    None => warn!(%id, "Response for unknown request"),
                }
            }

            Ok(InboundFrame::Push { event, data }) => {
                let snapshot: Vec<MessageHandler> = state
                    .handlers
                    .read()
                    .get(&event)
                    .cloned()
                    .unwrap_or_default();

                trace!(event = %event, handlers = snapshot.len(), "Push message");
                for handler in &snapshot {
                    handler(&data);
                }
            }

            Err(e) => warn!(error = %e, text = %text, "Dropping incoming message"),
        }
    }

    /// Drops callbacks whose responses can no longer arrive.
    fn drop_pending_requests(state: &SocketState) {
        let count = {
            let mut correlation = state.correlation.lock();
            let count = correlation.len();
            correlation.clear();
            count
        };

        if count > 0 {
            debug!(count, "Dropped pending requests on close");
        }
    }
}

// ============================================================================
// Connection
// ============================================================================

impl Connection for SocketConnection {
    fn on(&self, event: &str, handler: MessageHandler) {
        self.state
            .handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::Acquire)
    }

    fn request(
        &self,
        id: RequestId,
        request: TransportRequest,
        callback: ResponseCallback,
    ) -> Result<()> {
        let text = to_string(&RequestFrame::new(id, &request))?;

        self.command_tx
            .send(SocketCommand::Send { id, text, callback })
            .map_err(|_| Error::ConnectionClosed)
    }
}

impl fmt::Debug for SocketConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketConnection")
            .field("url", &self.url.as_str())
            .field("connected", &self.is_connected())
            .field("pending", &self.pending_count())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
