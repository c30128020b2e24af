//! Connection health check.
//!
//! Located is not the same as healthy: a connection may sit in its slot
//! for a while before its socket finishes connecting.

use super::Connection;

/// Returns `true` if a connection is located and its socket reports connected.
///
/// Pure read, safe to call at any frequency.
#[inline]
#[must_use]
pub fn is_healthy(connection: Option<&dyn Connection>) -> bool {
    connection.is_some_and(|c| c.is_connected())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transport::LoopbackConnection;

    #[test]
    fn test_absent_connection_is_unhealthy() {
        assert!(!is_healthy(None));
    }

    #[test]
    fn test_health_follows_connected_flag() {
        let connection = LoopbackConnection::new();
        assert!(!is_healthy(Some(&connection)));

        connection.set_connected(true);
        assert!(is_healthy(Some(&connection)));

        connection.set_connected(false);
        assert!(!is_healthy(Some(&connection)));
    }
}
