//! Named-channel event bus.
//!
//! Listeners subscribe to a channel name and receive a shared reference to
//! every event triggered on it. Handlers are snapshotted and invoked outside
//! the registry lock, so a handler may subscribe, unsubscribe or trigger
//! again without deadlocking.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::identifiers::SubscriptionId;

// ============================================================================
// Types
// ============================================================================

/// Listener callback.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Listeners grouped by channel, in subscription order.
type ListenerMap<E> = FxHashMap<String, Vec<(SubscriptionId, Listener<E>)>>;

// ============================================================================
// EventBus
// ============================================================================

/// Publish/subscribe registry keyed by channel name.
///
/// # Example
///
/// ```
/// use socket_sync::EventBus;
/// use serde_json::{json, Value};
///
/// let bus: EventBus<Value> = EventBus::new();
/// let id = bus.on("comet", |message| println!("pushed: {message}"));
/// assert_eq!(bus.trigger("comet", &json!({"verb": "create"})), 1);
/// assert!(bus.off(id));
/// ```
pub struct EventBus<E> {
    listeners: RwLock<ListenerMap<E>>,
}

impl<E> EventBus<E> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(FxHashMap::default()),
        }
    }

    /// Subscribes a listener to a channel.
    pub fn on<F>(&self, channel: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId::next();
        let channel = channel.into();
        trace!(%id, channel = %channel, "Listener subscribed");

        self.listeners
            .write()
            .entry(channel)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let mut removed = false;

        listeners.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|(entry_id, _)| *entry_id != id);
            removed |= entries.len() != before;
            !entries.is_empty()
        });

        removed
    }

    /// Delivers an event to every listener on `channel`.
    ///
    /// Returns the number of listeners invoked.
    pub fn trigger(&self, channel: &str, event: &E) -> usize {
        let snapshot: Vec<Listener<E>> = match self.listeners.read().get(channel) {
            Some(entries) => entries.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return 0,
        };

        for listener in &snapshot {
            listener(event);
        }

        snapshot.len()
    }

    /// Returns the number of listeners on `channel`.
    #[must_use]
    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners.read().get(channel).map_or(0, Vec::len)
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let mut channels: Vec<_> = listeners
            .iter()
            .map(|(channel, entries)| (channel.as_str(), entries.len()))
            .collect();
        channels.sort_unstable();

        f.debug_struct("EventBus")
            .field("channels", &channels)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
