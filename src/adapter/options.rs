//! Adapter configuration.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use socket_sync::{SyncMode, SyncOptions};
//!
//! let options = SyncOptions::new()
//!     .with_mode(SyncMode::Strict)
//!     .with_poll_interval(Duration::from_millis(100))
//!     .with_slots(["app.socket"]);
//! assert_eq!(options.slots, vec!["app.socket".to_string()]);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Preferred slot for the connection.
pub const SLOT_ADAPTER: &str = "adapter.socket";

/// Fallback slot for the connection.
pub const SLOT_GLOBAL: &str = "global.socket";

/// Delay before the first acquisition attempt.
pub const DEFAULT_INITIAL_ACQUIRE_DELAY: Duration = Duration::from_millis(250);

/// Delay between later acquisition attempts.
pub const DEFAULT_ACQUIRE_INTERVAL: Duration = Duration::from_millis(1500);

/// Acquisition attempts made by the startup loop.
pub const DEFAULT_MAX_ACQUIRE_ATTEMPTS: u32 = 3;

/// Interval between readiness checks while calls are queued.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

// ============================================================================
// SyncMode
// ============================================================================

/// What a call does when the connection is located but not yet open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Queue the call and replay it once the connection opens.
    #[default]
    Queue,
    /// Fail immediately with [`Error::NotConnected`].
    Strict,
}

// ============================================================================
// SyncOptions
// ============================================================================

/// Adapter timing, slot and mode configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Slot names checked for the connection, highest priority first.
    pub slots: Vec<String>,

    /// Behavior while the connection is not open.
    pub mode: SyncMode,

    /// Delay before the first startup acquisition attempt.
    pub initial_acquire_delay: Duration,

    /// Delay between later startup acquisition attempts.
    pub acquire_interval: Duration,

    /// Total startup acquisition attempts.
    pub max_acquire_attempts: u32,

    /// Interval between readiness checks while calls are queued.
    pub poll_interval: Duration,

    /// Give up on queued calls after this many poll ticks.
    ///
    /// `None` polls until the connection opens. A connection that is
    /// located but never opens then keeps calls queued forever.
    pub max_poll_ticks: Option<u32>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl SyncOptions {
    /// Creates options with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![SLOT_ADAPTER.to_string(), SLOT_GLOBAL.to_string()],
            mode: SyncMode::Queue,
            initial_acquire_delay: DEFAULT_INITIAL_ACQUIRE_DELAY,
            acquire_interval: DEFAULT_ACQUIRE_INTERVAL,
            max_acquire_attempts: DEFAULT_MAX_ACQUIRE_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_poll_ticks: None,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl SyncOptions {
    /// Replaces the slot list.
    #[inline]
    #[must_use]
    pub fn with_slots(mut self, slots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the mode.
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the startup acquisition schedule.
    #[inline]
    #[must_use]
    pub fn with_acquire_schedule(mut self, initial: Duration, interval: Duration, attempts: u32) -> Self {
        self.initial_acquire_delay = initial;
        self.acquire_interval = interval;
        self.max_acquire_attempts = attempts;
        self
    }

    /// Sets the readiness poll interval.
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds how long queued calls wait.
    #[inline]
    #[must_use]
    pub fn with_max_poll_ticks(mut self, ticks: u32) -> Self {
        self.max_poll_ticks = Some(ticks);
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl SyncOptions {
    /// Checks the options are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(Error::config(
                "At least one connection slot is required.\n\
                 Example: SyncOptions::new().with_slots([\"adapter.socket\"])",
            ));
        }
        if self.slots.iter().any(String::is_empty) {
            return Err(Error::config("Connection slot names must not be empty"));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::config("Poll interval must be non-zero"));
        }
        if self.acquire_interval.is_zero() {
            return Err(Error::config("Acquire interval must be non-zero"));
        }
        if self.max_acquire_attempts == 0 {
            return Err(Error::config("At least one acquisition attempt is required"));
        }
        if self.max_poll_ticks == Some(0) {
            return Err(Error::config("max_poll_ticks must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SyncOptions::new();
        assert_eq!(options.slots, vec!["adapter.socket", "global.socket"]);
        assert_eq!(options.mode, SyncMode::Queue);
        assert_eq!(options.initial_acquire_delay, Duration::from_millis(250));
        assert_eq!(options.acquire_interval, Duration::from_millis(1500));
        assert_eq!(options.max_acquire_attempts, 3);
        assert!(options.max_poll_ticks.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let options = SyncOptions::new()
            .with_mode(SyncMode::Strict)
            .with_acquire_schedule(Duration::from_millis(1), Duration::from_millis(2), 5)
            .with_max_poll_ticks(10);
        assert_eq!(options.mode, SyncMode::Strict);
        assert_eq!(options.max_acquire_attempts, 5);
        assert_eq!(options.max_poll_ticks, Some(10));
    }

    #[test]
    fn test_validate_rejects_empty_slots() {
        let options = SyncOptions::new().with_slots(Vec::<String>::new());
        assert!(matches!(options.validate(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_poll_interval() {
        let options = SyncOptions::new().with_poll_interval(Duration::ZERO);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let options =
            SyncOptions::new().with_acquire_schedule(Duration::ZERO, Duration::from_secs(1), 0);
        assert!(options.validate().is_err());
    }
}
