//! Connection transport layer.
//!
//! Persistence calls travel over one long-lived connection instead of
//! discrete HTTP requests. This module defines the [`Connection`] seam, how
//! the process's single connection is found, and two implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   publish    ┌──────────────┐
//! │ Application      │─────────────►│ SlotRegistry │
//! │ (opens socket)   │              │  "adapter.socket"
//! └──────────────────┘              │  "global.socket"
//!                                   └──────┬───────┘
//!                                          │ locate (sticky)
//!                                   ┌──────▼───────────┐
//!                                   │ ConnectionLocator│──► InboundBridge
//!                                   └──────┬───────────┘
//!                                          │
//!                               ┌──────────▼──────────┐
//!                               │ dyn Connection      │
//!                               │  SocketConnection   │ (WebSocket)
//!                               │  LoopbackConnection │ (in-process)
//!                               └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `health` | Open/connected check |
//! | `locator` | Slot registry and sticky locator |
//! | `loopback` | In-process connection |
//! | `socket` | WebSocket connection and event loop |

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::identifiers::RequestId;
use crate::protocol::TransportRequest;

// ============================================================================
// Submodules
// ============================================================================

/// Connection health check.
pub mod health;

/// Slot registry and sticky connection locator.
pub mod locator;

/// In-process connection.
pub mod loopback;

/// WebSocket connection and event loop.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

pub use health::is_healthy;
pub use locator::{ConnectionLocator, Located, SlotRegistry};
pub use loopback::{LoopbackConnection, Responder};
pub use socket::SocketConnection;

// ============================================================================
// Types
// ============================================================================

/// Handler for an inbound connection event.
pub type MessageHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Invoked once with the response body. Never invoked on failure.
pub type ResponseCallback = Box<dyn FnOnce(Value) + Send>;

/// Shared handle to a connection.
pub type ConnectionRef = Arc<dyn Connection>;

// ============================================================================
// Connection
// ============================================================================

/// A bidirectional connection able to carry simulated HTTP requests.
pub trait Connection: Send + Sync {
    /// Subscribes to an inbound event.
    fn on(&self, event: &str, handler: MessageHandler);

    /// Returns `true` while the underlying socket is open.
    fn is_connected(&self) -> bool;

    /// Sends a request. `callback` receives the response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`](crate::Error::ConnectionClosed)
    /// if the request could not be handed to the connection.
    fn request(
        &self,
        id: RequestId,
        request: TransportRequest,
        callback: ResponseCallback,
    ) -> Result<()>;
}
