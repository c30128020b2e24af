//! Slot registry and sticky connection locator.
//!
//! The application publishes its connection into a well-known named slot.
//! The locator checks slots in a fixed priority order; the first occupied
//! slot wins and is remembered for the rest of the process.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use socket_sync::{LoopbackConnection, SlotRegistry};
//!
//! let registry = Arc::new(SlotRegistry::new());
//! registry.publish("global.socket", Arc::new(LoopbackConnection::new()));
//! assert!(registry.get("global.socket").is_some());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::events::InboundBridge;

use super::ConnectionRef;

// ============================================================================
// SlotRegistry
// ============================================================================

/// Process-wide registry behind [`SlotRegistry::global`].
static GLOBAL_REGISTRY: OnceLock<Arc<SlotRegistry>> = OnceLock::new();

/// Named locations a connection may be published in.
#[derive(Default)]
pub struct SlotRegistry {
    slots: RwLock<FxHashMap<String, ConnectionRef>>,
}

impl SlotRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide registry.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(GLOBAL_REGISTRY.get_or_init(|| Arc::new(Self::new())))
    }

    /// Publishes a connection, returning the one it replaced.
    ///
    /// A locator that already located a connection keeps using it.
    pub fn publish(&self, slot: impl Into<String>, connection: ConnectionRef) -> Option<ConnectionRef> {
        let slot = slot.into();
        debug!(slot = %slot, "Connection published");
        self.slots.write().insert(slot, connection)
    }

    /// Removes a connection from a slot.
    pub fn clear(&self, slot: &str) -> Option<ConnectionRef> {
        self.slots.write().remove(slot)
    }

    /// Returns the connection in a slot.
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<ConnectionRef> {
        self.slots.read().get(slot).cloned()
    }
}

impl fmt::Debug for SlotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut occupied: Vec<String> = self.slots.read().keys().cloned().collect();
        occupied.sort_unstable();
        f.debug_struct("SlotRegistry")
            .field("occupied", &occupied)
            .finish()
    }
}

// ============================================================================
// Located
// ============================================================================

/// A located connection and the slot it was found in.
#[derive(Clone)]
pub struct Located {
    /// The connection.
    pub connection: ConnectionRef,
    /// Slot name it came from.
    pub source: String,
}

impl fmt::Debug for Located {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Located")
            .field("source", &self.source)
            .field("connected", &self.connection.is_connected())
            .finish()
    }
}

// ============================================================================
// ConnectionLocator
// ============================================================================

/// Finds the process's connection and remembers it.
pub struct ConnectionLocator {
    registry: Arc<SlotRegistry>,
    slots: Vec<String>,
    located: Mutex<Option<Located>>,
    bridge: InboundBridge,
}

impl ConnectionLocator {
    /// Creates a locator checking `slots` in order.
    #[must_use]
    pub fn new(registry: Arc<SlotRegistry>, slots: Vec<String>, bridge: InboundBridge) -> Self {
        Self {
            registry,
            slots,
            located: Mutex::new(None),
            bridge,
        }
    }

    /// Returns the connection, locating it on first success.
    ///
    /// Absence is a normal, retryable state. The first successful location
    /// attaches the inbound bridge exactly once.
    pub fn locate(&self) -> Option<Located> {
        let found = {
            let mut located = self.located.lock();
            if let Some(existing) = located.as_ref() {
                return Some(existing.clone());
            }

            let found = self.slots.iter().find_map(|slot| {
                self.registry.get(slot).map(|connection| Located {
                    connection,
                    source: slot.clone(),
                })
            })?;

            *located = Some(found.clone());
            found
        };

        info!(source = %found.source, "Connection located");
        self.bridge.attach(found.connection.as_ref());
        Some(found)
    }

    /// Returns the connection if already located, without searching.
    #[must_use]
    pub fn located(&self) -> Option<Located> {
        self.located.lock().clone()
    }

    /// Returns `true` if a connection has been located.
    #[must_use]
    pub fn is_located(&self) -> bool {
        self.located.lock().is_some()
    }

    /// Returns the slot names checked, in priority order.
    #[inline]
    #[must_use]
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Returns the inbound bridge.
    #[inline]
    #[must_use]
    pub fn bridge(&self) -> &InboundBridge {
        &self.bridge
    }
}

impl fmt::Debug for ConnectionLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionLocator")
            .field("slots", &self.slots)
            .field("located", &*self.located.lock())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::events::{EventBus, INBOUND_EVENT};
    use crate::transport::LoopbackConnection;

    fn locator(registry: &Arc<SlotRegistry>) -> ConnectionLocator {
        ConnectionLocator::new(
            Arc::clone(registry),
            vec!["adapter.socket".to_string(), "global.socket".to_string()],
            InboundBridge::new(Arc::new(EventBus::new())),
        )
    }

    #[test]
    fn test_absent_is_not_an_error() {
        let registry = Arc::new(SlotRegistry::new());
        let locator = locator(&registry);
        assert!(locator.locate().is_none());
        assert!(!locator.is_located());
    }

    #[test]
    fn test_priority_order() {
        let registry = Arc::new(SlotRegistry::new());
        registry.publish("global.socket", Arc::new(LoopbackConnection::new()));
        registry.publish("adapter.socket", Arc::new(LoopbackConnection::new()));

        let located = locator(&registry).locate().expect("located");
        assert_eq!(located.source, "adapter.socket");
    }

    #[test]
    fn test_unlisted_slots_are_ignored() {
        let registry = Arc::new(SlotRegistry::new());
        registry.publish("elsewhere", Arc::new(LoopbackConnection::new()));
        assert!(locator(&registry).locate().is_none());
    }

    #[test]
    fn test_location_is_sticky() {
        let registry = Arc::new(SlotRegistry::new());
        let first = LoopbackConnection::new();
        registry.publish("global.socket", Arc::new(first.clone()));

        let locator = locator(&registry);
        assert_eq!(locator.locate().expect("located").source, "global.socket");

        // A higher priority slot filled later does not replace the connection.
        registry.publish("adapter.socket", Arc::new(LoopbackConnection::new()));
        registry.clear("global.socket");

        let again = locator.locate().expect("still located");
        assert_eq!(again.source, "global.socket");

        first.set_connected(true);
        assert!(again.connection.is_connected());
    }

    #[test]
    fn test_bridge_attached_once() {
        let registry = Arc::new(SlotRegistry::new());
        let connection = LoopbackConnection::new();
        registry.publish("global.socket", Arc::new(connection.clone()));

        let locator = locator(&registry);
        for _ in 0..5 {
            locator.locate();
        }

        assert!(locator.bridge().is_attached());
        assert_eq!(connection.handler_count(INBOUND_EVENT), 1);
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(Arc::ptr_eq(&SlotRegistry::global(), &SlotRegistry::global()));
    }
}
