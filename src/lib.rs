//! Socket Sync - persistence calls over a shared WebSocket connection.
//!
//! This library replaces a data-binding layer's per-request HTTP transport
//! with one long-lived bidirectional connection. Every create/read/update/
//! delete on a model or collection is translated into a request on that
//! connection, and the response is wired back into the caller's callbacks
//! and lifecycle events.
//!
//! # Architecture
//!
//! The connection usually does not exist, or is not yet open, when the
//! first persistence calls are made:
//!
//! - **Locate**: the connection is found in a well-known named slot and
//!   remembered for the rest of the process
//! - **Queue**: calls made while it is still opening wait in FIFO order
//! - **Replay**: a poller drains the queue the moment it opens
//! - **Bridge**: server push messages are re-emitted on one shared bus
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use socket_sync::{
//!     COMET_CHANNEL, CallOptions, Resource, Result, SlotRegistry, SocketConnection, SyncAdapter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Publish the connection where the adapter looks for it
//!     let socket = SocketConnection::open("ws://localhost:1337")?;
//!     SlotRegistry::global().publish("global.socket", Arc::new(socket));
//!
//!     let adapter = SyncAdapter::builder().build()?;
//!     adapter.bus().on(COMET_CHANNEL, |message| println!("pushed: {message}"));
//!
//!     // Fetch a collection; queued if the socket is still connecting
//!     let todos = Arc::new(Resource::collection().with_url("/todo"));
//!     let _outcome = adapter.sync(
//!         "read",
//!         todos,
//!         CallOptions::new().on_success(|body| println!("todos: {body}")),
//!     )?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapter`] | [`SyncAdapter`] entry point, queue, poller, retry loop |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`events`] | [`EventBus`], inbound bridge, lifecycle events |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`model`] | [`SyncTarget`], [`Resource`], [`CallOptions`] |
//! | [`protocol`] | Methods, verbs, requests, wire frames |
//! | [`transport`] | [`Connection`] trait, locator, WebSocket and loopback connections |
//!
//! # Known Limitation
//!
//! In [`SyncMode::Queue`] a connection that is located but never opens keeps
//! calls queued indefinitely and silently. Bound it with
//! [`SyncOptions::with_max_poll_ticks`] in production.

// ============================================================================
// Modules
// ============================================================================

/// Persistence entry point and queueing machinery.
///
/// Use [`SyncAdapter::builder()`] to create a configured adapter.
pub mod adapter;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Event bus, inbound bridge and lifecycle events.
pub mod events;

/// Type-safe identifiers.
pub mod identifiers;

/// Models, collections and call options.
pub mod model;

/// Transport protocol types.
pub mod protocol;

/// Connection transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Adapter types
pub use adapter::{SyncAdapter, SyncBuilder, SyncMode, SyncOptions, SyncOutcome};

// Error types
pub use error::{Error, Result};

// Event types
pub use events::{
    COMET_CHANNEL, EventBus, INBOUND_EVENT, REQUEST_EVENT, RequestEvent, TargetEvent,
};

// Identifier types
pub use identifiers::{RequestId, SubscriptionId};

// Model types
pub use model::{CallOptions, Resource, ResourceKind, SyncTarget, TargetRef, UrlSource};

// Protocol types
pub use protocol::{InFlight, SyncMethod, TransportRequest, Verb};

// Transport types
pub use transport::{Connection, LoopbackConnection, SlotRegistry, SocketConnection};
