//! Online presence tracking.

use dashmap::DashMap;

use super::ConnectionId;

/// Process-wide map of online users to the connection that registered them.
///
/// Holds at most one entry per user; the most recent registration wins.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: DashMap<i64, ConnectionId>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `user_id` at `connection`, replacing any earlier connection.
    ///
    /// The replaced connection is left open and is not notified. Returns
    /// `true` when the user was not online before.
    pub fn register(&self, user_id: i64, connection: ConnectionId) -> bool {
        self.entries.insert(user_id, connection).is_none()
    }

    /// Remove `user_id` if its entry still belongs to `connection`.
    ///
    /// Returns `true` when an entry was removed, i.e. the user went offline.
    pub fn unregister(&self, user_id: i64, connection: ConnectionId) -> bool {
        self.entries
            .remove_if(&user_id, |_, current| *current == connection)
            .is_some()
    }

    /// Currently online user IDs, ascending.
    pub fn snapshot(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.entries.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn lookup(&self, user_id: i64) -> Option<ConnectionId> {
        self.entries.get(&user_id).map(|e| *e.value())
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.entries.contains_key(&user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
