//! # Connection Registry
//!
//! Process-wide advisory map from user to active real-time connection.
//! Insert on connect, remove on disconnect; the transport layer consults
//! it to decide where a push should go. It is never a source of truth —
//! losing an entry only delays delivery until the next login or poll.

use dashmap::DashMap;

use ajir_core::{ConnectionId, UserId};

/// Concurrent user → connection lookup table with explicit lifecycle.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<UserId, ConnectionId>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a user's connection, returning the one it replaced, if
    /// any. A reconnect simply supersedes the previous connection.
    pub fn connect(&self, user_id: UserId, connection_id: ConnectionId) -> Option<ConnectionId> {
        self.connections.insert(user_id, connection_id)
    }

    /// Remove a user's connection, but only if it is still the one being
    /// disconnected. A stale disconnect arriving after a reconnect must
    /// not tear down the fresh connection.
    pub fn disconnect(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        self.connections
            .remove_if(&user_id, |_, current| *current == connection_id)
            .is_some()
    }

    /// The user's active connection, if any.
    pub fn lookup(&self, user_id: UserId) -> Option<ConnectionId> {
        self.connections.get(&user_id).map(|entry| *entry.value())
    }

    /// Whether the user has an active connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.connections.contains_key(&user_id)
    }

    /// Number of active connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no connections are registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connection_count", &self.connections.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_lookup() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let conn = ConnectionId::new();
        assert!(registry.connect(user, conn).is_none());
        assert_eq!(registry.lookup(user), Some(conn));
        assert!(registry.is_online(user));
    }

    #[test]
    fn test_reconnect_replaces() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let first = ConnectionId::new();
        let second = ConnectionId::new();
        registry.connect(user, first);
        assert_eq!(registry.connect(user, second), Some(first));
        assert_eq!(registry.lookup(user), Some(second));
    }

    #[test]
    fn test_disconnect_removes() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let conn = ConnectionId::new();
        registry.connect(user, conn);
        assert!(registry.disconnect(user, conn));
        assert!(!registry.is_online(user));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stale_disconnect_is_ignored() {
        let registry = ConnectionRegistry::new();
        let user = UserId::new();
        let old = ConnectionId::new();
        let fresh = ConnectionId::new();
        registry.connect(user, old);
        registry.connect(user, fresh);
        // The old socket's teardown arrives late.
        assert!(!registry.disconnect(user, old));
        assert_eq!(registry.lookup(user), Some(fresh));
    }

    #[test]
    fn test_lookup_unknown_user() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.lookup(UserId::new()), None);
    }
}
