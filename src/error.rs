//! Error types for socket sync.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```no_run
//! use socket_sync::{CallOptions, Result, SyncAdapter, SyncMethod, TargetRef};
//!
//! fn fetch(adapter: &SyncAdapter, todos: TargetRef) -> Result<()> {
//!     let outcome = adapter.sync(SyncMethod::Read, todos, CallOptions::new())?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Acquisition | [`Error::TransportUnavailable`], [`Error::NotConnected`] |
//! | Call | [`Error::MissingUrl`], [`Error::QueueAbandoned`] |
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::ConnectionClosed`], [`Error::Protocol`] |
//! | External | [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Acquisition Errors
    // ========================================================================
    /// No connection could be located in any well-known slot.
    ///
    /// Returned synchronously by `sync` when a call needs the connection
    /// and none of the configured slots hold one.
    #[error(
        "Cannot find a suitable socket connection.\n\
         Expected the active connection in one of: {}.\n\
         Publish it with `SlotRegistry::publish` before syncing.",
        .slots.join(", ")
    )]
    TransportUnavailable {
        /// Slot names checked, in priority order.
        slots: Vec<String>,
    },

    /// The connection is located but not yet open (strict mode only).
    #[error(
        "Trying to communicate with the server using `{source_slot}`, \
         but its `connected` flag is still false.\n\
         The socket may not have finished connecting yet; wait for the \
         connect handshake before syncing."
    )]
    NotConnected {
        /// Slot the connection was located in.
        source_slot: String,
    },

    // ========================================================================
    // Call Errors
    // ========================================================================
    /// Neither the call options nor the target supplied a URL.
    #[error("A \"url\" property or function must be specified")]
    MissingUrl,

    /// A queued call was dropped because the poller gave up.
    #[error("Queued call abandoned after {ticks} poll ticks without a healthy connection")]
    QueueAbandoned {
        /// Poll ticks elapsed before giving up.
        ticks: u32,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when adapter or connection configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Connection closed before the request could be written.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Protocol violation or unexpected frame.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a transport unavailable error listing the expected slots.
    #[inline]
    pub fn transport_unavailable(slots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::TransportUnavailable {
            slots: slots.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a not connected error for the given slot.
    #[inline]
    pub fn not_connected(source_slot: impl Into<String>) -> Self {
        Self::NotConnected {
            source_slot: source_slot.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a queue abandoned error.
    #[inline]
    pub fn queue_abandoned(ticks: u32) -> Self {
        Self::QueueAbandoned { ticks }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error comes from locating or checking the connection.
    #[inline]
    #[must_use]
    pub fn is_acquisition_error(&self) -> bool {
        matches!(
            self,
            Self::TransportUnavailable { .. } | Self::NotConnected { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionClosed | Self::Protocol { .. } | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the call may succeed when submitted again.
    ///
    /// A missing URL is a programming error and never recoverable.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TransportUnavailable { .. }
                | Self::NotConnected { .. }
                | Self::ConnectionClosed
                | Self::QueueAbandoned { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_unavailable_lists_slots() {
        let err = Error::transport_unavailable(["adapter.socket", "global.socket"]);
        let text = err.to_string();
        assert!(text.contains("adapter.socket, global.socket"));
        assert!(text.contains("SlotRegistry::publish"));
    }

    #[test]
    fn test_not_connected_names_slot() {
        let err = Error::not_connected("global.socket");
        let text = err.to_string();
        assert!(text.contains("`global.socket`"));
        assert!(text.contains("connected"));
    }

    #[test]
    fn test_missing_url_display() {
        assert_eq!(
            Error::MissingUrl.to_string(),
            "A \"url\" property or function must be specified"
        );
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("poll interval must be non-zero");
        assert_eq!(
            err.to_string(),
            "Configuration error: poll interval must be non-zero"
        );
    }

    #[test]
    fn test_is_acquisition_error() {
        assert!(Error::transport_unavailable(["a"]).is_acquisition_error());
        assert!(Error::not_connected("a").is_acquisition_error());
        assert!(!Error::MissingUrl.is_acquisition_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::ConnectionClosed.is_recoverable());
        assert!(Error::queue_abandoned(3).is_recoverable());
        assert!(!Error::MissingUrl.is_recoverable());
        assert!(!Error::config("x").is_recoverable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
