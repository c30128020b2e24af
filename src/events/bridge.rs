//! Inbound push-message bridge.
//!
//! Re-emits every push message the connection receives on the shared event
//! bus under [`COMET_CHANNEL`], so application code listens in one place
//! regardless of transport.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tracing::debug;

use crate::transport::Connection;

use super::EventBus;

// ============================================================================
// Constants
// ============================================================================

/// Connection event carrying server push messages.
pub const INBOUND_EVENT: &str = "message";

/// Bus channel push messages are re-emitted on.
pub const COMET_CHANNEL: &str = "comet";

// ============================================================================
// InboundBridge
// ============================================================================

/// Forwards connection push messages to the shared bus.
#[derive(Debug)]
pub struct InboundBridge {
    bus: Arc<EventBus<Value>>,
    attached: AtomicBool,
}

impl InboundBridge {
    /// Creates a bridge targeting `bus`.
    #[must_use]
    pub fn new(bus: Arc<EventBus<Value>>) -> Self {
        Self {
            bus,
            attached: AtomicBool::new(false),
        }
    }

    /// Subscribes to the connection's inbound messages.
    ///
    /// Only the first call subscribes; later calls return `false`.
    pub fn attach(&self, connection: &dyn Connection) -> bool {
        if self.attached.swap(true, Ordering::AcqRel) {
            return false;
        }

        let bus = Arc::clone(&self.bus);
        connection.on(
            INBOUND_EVENT,
            Arc::new(move |message: &Value| {
                bus.trigger(COMET_CHANNEL, message);
            }),
        );

        debug!(event = INBOUND_EVENT, channel = COMET_CHANNEL, "Inbound bridge attached");
        true
    }

    /// Returns `true` once [`attach`](Self::attach) has subscribed.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Returns the bus messages are forwarded to.
    #[inline]
    #[must_use]
    pub fn bus(&self) -> &Arc<EventBus<Value>> {
        &self.bus
    }
}

// ============================================================================
// Tests
// ============================================================================
