//! A ready-made [`SyncTarget`].
//!
//! [`Resource`] is a minimal model or collection: a URL, an attribute map
//! and its own lifecycle event bus. Applications with their own model layer
//! implement [`SyncTarget`] directly instead.
//!
//! # Example
//!
//! ```
//! use socket_sync::Resource;
//! use serde_json::json;
//!
//! let todo = Resource::model()
//!     .with_url("/todos/7")
//!     .with_attribute("id", json!(7))
//!     .with_attribute("title", json!("milk"));
//! assert_eq!(todo.get("title"), Some(json!("milk")));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::events::{EventBus, TargetEvent};

use super::{CallOptions, SyncTarget, UrlSource};

// ============================================================================
// ResourceKind
// ============================================================================

/// Whether a resource behaves as a single model or a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// Serializes its attributes.
    Model,
    /// Has no attribute body of its own.
    Collection,
}

// ============================================================================
// Resource
// ============================================================================

/// A model or collection with an attribute map and lifecycle events.
pub struct Resource {
    kind: ResourceKind,
    url: Option<UrlSource>,
    attributes: RwLock<Map<String, Value>>,
    events: EventBus<TargetEvent>,
}

// ============================================================================
// Resource - Constructors
// ============================================================================

impl Resource {
    /// Creates an empty model.
    #[must_use]
    pub fn model() -> Self {
        Self::with_kind(ResourceKind::Model)
    }

    /// Creates an empty collection.
    #[must_use]
    pub fn collection() -> Self {
        Self::with_kind(ResourceKind::Collection)
    }

    fn with_kind(kind: ResourceKind) -> Self {
        Self {
            kind,
            url: None,
            attributes: RwLock::new(Map::new()),
            events: EventBus::new(),
        }
    }

    /// Sets a fixed URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<UrlSource>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets a URL accessor.
    #[must_use]
    pub fn with_url_fn(mut self, accessor: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.url = Some(UrlSource::computed(accessor));
        self
    }

    /// Sets one attribute.
    #[must_use]
    pub fn with_attribute(self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.write().insert(key.into(), value);
        self
    }

    /// Replaces all attributes.
    #[must_use]
    pub fn with_attributes(self, attributes: Map<String, Value>) -> Self {
        *self.attributes.write() = attributes;
        self
    }
}

// ============================================================================
// Resource - Accessors
// ============================================================================

impl Resource {
    /// Returns the resource kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns one attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.read().get(key).cloned()
    }

    /// Sets one attribute, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.write().insert(key.into(), value)
    }

    /// Returns a copy of all attributes.
    #[must_use]
    pub fn attributes(&self) -> Map<String, Value> {
        self.attributes.read().clone()
    }

    /// Returns the lifecycle event bus.
    #[inline]
    #[must_use]
    pub fn events(&self) -> &EventBus<TargetEvent> {
        &self.events
    }
}

// ============================================================================
// SyncTarget
// ============================================================================

impl SyncTarget for Resource {
    fn url(&self) -> Option<String> {
        self.url.as_ref().map(UrlSource::resolve)
    }

    fn to_json(&self, _options: &CallOptions) -> Option<Map<String, Value>> {
        match self.kind {
            ResourceKind::Model => Some(self.attributes()),
            ResourceKind::Collection => None,
        }
    }

    fn id(&self) -> Option<Value> {
        self.get("id").filter(|id| !id.is_null())
    }

    fn trigger(&self, event: &TargetEvent) {
        self.events.trigger(event.channel(), event);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("attributes", &*self.attributes.read())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_model_serializes_attributes() {
        let todo = Resource::model()
            .with_attribute("a", json!(1))
            .with_attribute("b", json!(2));
        let json = todo.to_json(&CallOptions::new()).expect("model has attributes");
        assert_eq!(Value::Object(json), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_collection_has_no_body() {
        let todos = Resource::collection().with_url("/todos");
        assert!(todos.to_json(&CallOptions::new()).is_none());
        assert_eq!(todos.url().as_deref(), Some("/todos"));
    }

    #[test]
    fn test_id_comes_from_attributes() {
        let todo = Resource::model();
        assert!(todo.id().is_none());

        todo.set("id", json!(42));
        assert_eq!(todo.id(), Some(json!(42)));

        todo.set("id", Value::Null);
        assert!(todo.id().is_none());
    }

    #[test]
    fn test_url_accessor_resolved_lazily() {
        let todo = Resource::model().with_url_fn(|| "/todos/lazy".to_string());
        assert_eq!(todo.url().as_deref(), Some("/todos/lazy"));
    }
}
