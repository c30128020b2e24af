//! The model/collection seam.
//!
//! The data-binding library is external; the adapter only needs the four
//! facts this trait exposes.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::events::TargetEvent;

use super::CallOptions;

/// Shared handle to a model or collection.
pub type TargetRef = Arc<dyn SyncTarget>;

/// A model or collection that can be persisted.
pub trait SyncTarget: Send + Sync {
    /// The target's own endpoint, if it has one.
    fn url(&self) -> Option<String>;

    /// Serialized attributes, or `None` if the target has none to send.
    fn to_json(&self, options: &CallOptions) -> Option<Map<String, Value>>;

    /// The target's identifier, if assigned.
    fn id(&self) -> Option<Value>;

    /// Delivers a lifecycle event to the target's listeners.
    fn trigger(&self, event: &TargetEvent);
}
