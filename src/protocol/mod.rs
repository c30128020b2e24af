//! Transport protocol types.
//!
//! This module defines how a persistence call looks once translated for
//! the connection, and the JSON frames the WebSocket connection exchanges.
//!
//! # Message Overview
//!
//! | Type | Direction | Purpose |
//! |------|-----------|---------|
//! | [`TransportRequest`] | Local | Translated call (url, payload, verb) |
//! | [`RequestFrame`] | Local → Server | Request on the wire |
//! | [`InboundFrame::Response`] | Server → Local | Response body |
//! | [`InboundFrame::Push`] | Server → Local | Push message |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `frame` | Wire frames |
//! | `method` | Method to verb mapping |
//! | `request` | Transport request and in-flight handle |

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket wire frames.
pub mod frame;

/// Persistence methods and transport verbs.
pub mod method;

/// Transport request and in-flight handle.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use frame::{InboundFrame, RequestFrame};
pub use method::{SyncMethod, Verb};
pub use request::{InFlight, TransportRequest};
