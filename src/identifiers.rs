//! Type-safe identifiers.
//!
//! Newtype wrappers keep request correlation IDs and event subscription
//! handles from being mixed up.
//!
//! | Type | Backing | Scope |
//! |------|---------|-------|
//! | [`RequestId`] | UUID v4 | One dispatched transport request |
//! | [`SubscriptionId`] | `u64` counter | One event bus listener |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// RequestId
// ============================================================================

/// Correlation ID for a request sent over the connection.
///
/// Responses carry the same ID back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request ID.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    #[inline]
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// SubscriptionId
// ============================================================================

/// Process-wide counter backing [`SubscriptionId::next`].
static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(1);

/// Handle for an event bus listener, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Allocates the next unique subscription ID.
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_unique() {
        assert_ne!(RequestId::generate(), RequestId::generate());
    }

    #[test]
    fn test_request_id_serializes_as_plain_uuid() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("uuid");
        let id = RequestId::from(uuid);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
    }

    #[test]
    fn test_subscription_ids_increase() {
        let a = SubscriptionId::next();
        let b = SubscriptionId::next();
        assert!(b > a);
        assert_eq!(b.to_string(), format!("sub-{}", b.as_u64()));
    }
}
