//! Per-call options.
//!
//! # Example
//!
//! ```
//! use socket_sync::CallOptions;
//!
//! let options = CallOptions::new()
//!     .with_url("/todos/7")
//!     .with_patch()
//!     .on_success(|response| println!("saved: {response}"));
//! assert!(options.patch);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::Error;

// ============================================================================
// Types
// ============================================================================

/// Called with the server's response body.
pub type SuccessCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Called when a queued call cannot be executed on replay.
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

// ============================================================================
// UrlSource
// ============================================================================

/// An endpoint given either as a string or as an accessor evaluated at send time.
#[derive(Clone)]
pub enum UrlSource {
    /// Fixed URL.
    Static(String),
    /// URL computed when the call executes.
    Computed(Arc<dyn Fn() -> String + Send + Sync>),
}

impl UrlSource {
    /// Creates an accessor-backed source.
    #[inline]
    #[must_use]
    pub fn computed(accessor: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(accessor))
    }

    /// Produces the URL, invoking the accessor if there is one.
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Static(url) => url.clone(),
            Self::Computed(accessor) => accessor(),
        }
    }
}

impl From<&str> for UrlSource {
    #[inline]
    fn from(url: &str) -> Self {
        Self::Static(url.to_string())
    }
}

impl From<String> for UrlSource {
    #[inline]
    fn from(url: String) -> Self {
        Self::Static(url)
    }
}

impl fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(url) => f.debug_tuple("Static").field(url).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ============================================================================
// CallOptions
// ============================================================================

/// Options accompanying a persistence call.
///
/// The adapter works on its own copy; nothing here is mutated.
#[derive(Clone, Default)]
pub struct CallOptions {
    /// Endpoint override. Takes precedence over the target's URL.
    pub url: Option<UrlSource>,

    /// Explicit request body. Used as-is when present.
    pub data: Option<Map<String, Value>>,

    /// Attributes to send instead of the target's full serialization.
    pub attrs: Option<Map<String, Value>>,

    /// Partial update; the target's ID is added to the body if missing.
    pub patch: bool,

    /// Invoked with the response body.
    pub success: Option<SuccessCallback>,

    /// Invoked when a queued call fails on replay or is abandoned.
    pub error: Option<ErrorCallback>,
}

// ============================================================================
// Constructors
// ============================================================================

impl CallOptions {
    /// Creates empty options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl CallOptions {
    /// Sets a fixed URL override.
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<UrlSource>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets a URL accessor evaluated when the call executes.
    #[inline]
    #[must_use]
    pub fn with_url_fn(mut self, accessor: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.url = Some(UrlSource::computed(accessor));
        self
    }

    /// Sets an explicit request body.
    #[inline]
    #[must_use]
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets the attributes to send.
    #[inline]
    #[must_use]
    pub fn with_attrs(mut self, attrs: Map<String, Value>) -> Self {
        self.attrs = Some(attrs);
        self
    }

    /// Marks the call as a partial update.
    #[inline]
    #[must_use]
    pub fn with_patch(mut self) -> Self {
        self.patch = true;
        self
    }

    /// Sets the response callback.
    #[inline]
    #[must_use]
    pub fn on_success(mut self, callback: impl Fn(Value) + Send + Sync + 'static) -> Self {
        self.success = Some(Arc::new(callback));
        self
    }

    /// Sets the replay failure callback.
    #[inline]
    #[must_use]
    pub fn on_error(mut self, callback: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.error = Some(Arc::new(callback));
        self
    }
}

// ============================================================================
// Callback Helpers
// ============================================================================

impl CallOptions {
    /// Reports a failure to the error callback, if any.
    pub(crate) fn fail(&self, error: &Error) {
        if let Some(callback) = &self.error {
            callback(error);
        }
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("url", &self.url)
            .field("data", &self.data)
            .field("attrs", &self.attrs)
            .field("patch", &self.patch)
            .field("success", &self.success.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
