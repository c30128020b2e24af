//! Builder pattern for adapter configuration.
//!
//! Provides a fluent API for configuring and creating [`SyncAdapter`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use socket_sync::{SyncAdapter, SyncMode};
//!
//! # async fn example() -> socket_sync::Result<()> {
//! let adapter = SyncAdapter::builder()
//!     .mode(SyncMode::Strict)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tokio::runtime::Handle;

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::transport::SlotRegistry;

use super::core::SyncAdapter;
use super::{SyncMode, SyncOptions};

// ============================================================================
// SyncBuilder
// ============================================================================

/// Builder for configuring a [`SyncAdapter`].
///
/// Use [`SyncAdapter::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct SyncBuilder {
    /// Timing, slot and mode options.
    options: SyncOptions,
    /// Registry to locate the connection in. Defaults to the global one.
    registry: Option<Arc<SlotRegistry>>,
    /// Bus push messages are re-emitted on. Defaults to a fresh bus.
    bus: Option<Arc<EventBus<Value>>>,
}

// ============================================================================
// SyncBuilder Implementation
// ============================================================================

impl SyncBuilder {
    /// Creates a builder with default options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options.
    #[inline]
    #[must_use]
    pub fn options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the mode.
    #[inline]
    #[must_use]
    pub fn mode(mut self, mode: SyncMode) -> Self {
        self.options.mode = mode;
        self
    }

    /// Sets the slot names checked, highest priority first.
    #[inline]
    #[must_use]
    pub fn slots(mut self, slots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.options = self.options.with_slots(slots);
        self
    }

    /// Locates the connection in `registry` instead of the global one.
    #[inline]
    #[must_use]
    pub fn registry(mut self, registry: Arc<SlotRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Re-emits push messages on `bus`.
    #[inline]
    #[must_use]
    pub fn bus(mut self, bus: Arc<EventBus<Value>>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Builds the adapter and starts its acquisition loop.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the options are invalid
    /// - [`Error::Config`] if called outside a tokio runtime
    pub fn build(self) -> Result<SyncAdapter> {
        self.options.validate()?;

        let runtime = Handle::try_current().map_err(|_| {
            Error::config(
                "SyncAdapter must be built inside a tokio runtime.\n\
                 Call .build() from async code or within Runtime::enter().",
            )
        })?;

        let registry = self.registry.unwrap_or_else(SlotRegistry::global);
        let bus = self.bus.unwrap_or_default();

        Ok(SyncAdapter::new(self.options, registry, bus, runtime))
    }
}

// ============================================================================
// Tests
// ============================================================================
