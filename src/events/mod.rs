//! Event plumbing.
//!
//! Two kinds of implicit pub/sub are made explicit here:
//!
//! | Type | Channel | Payload |
//! |------|---------|---------|
//! | [`InboundBridge`] → global [`EventBus<Value>`] | `"comet"` | Push message, unmodified |
//! | target [`EventBus<TargetEvent>`] | `"request"` | [`RequestEvent`] |
//!
//! [`EventBus<Value>`]: EventBus
//! [`EventBus<TargetEvent>`]: EventBus

// ============================================================================
// Submodules
// ============================================================================

/// Push-message bridge.
pub mod bridge;

/// Named-channel event bus.
pub mod bus;

/// Per-target lifecycle events.
pub mod lifecycle;

// ============================================================================
// Re-exports
// ============================================================================

pub use bridge::{COMET_CHANNEL, INBOUND_EVENT, InboundBridge};
pub use bus::{EventBus, Listener};
pub use lifecycle::{REQUEST_EVENT, RequestEvent, TargetEvent};
