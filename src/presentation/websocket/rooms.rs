//! Room membership.
//!
//! Two indexes are kept in step under one lock: room to members, and
//! connection to rooms. The lock is never held across an await.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use super::ConnectionId;
use crate::domain::Room;

#[derive(Debug, Default)]
struct RoomTable {
    members: HashMap<Room, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<Room>>,
}

/// Tracks which connections sit in which rooms.
#[derive(Debug, Default)]
pub struct RoomRouter {
    table: RwLock<RoomTable>,
}

impl RoomRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `connection` to `room`. Returns `false` if it was already there.
    pub fn join(&self, connection: ConnectionId, room: Room) -> bool {
        let mut table = self.table.write();
        let added = table.members.entry(room).or_default().insert(connection);
        table.memberships.entry(connection).or_default().insert(room);
        added
    }

    /// Remove `connection` from `room`. Returns `false` if it was not there.
    pub fn leave(&self, connection: ConnectionId, room: Room) -> bool {
        let mut table = self.table.write();

        let removed = match table.members.get_mut(&room) {
            Some(members) => {
                let removed = members.remove(&connection);
                if members.is_empty() {
                    table.members.remove(&room);
                }
                removed
            }
            None => false,
        };

        if let Some(rooms) = table.memberships.get_mut(&connection) {
            rooms.remove(&room);
            if rooms.is_empty() {
                table.memberships.remove(&connection);
            }
        }

        removed
    }

    /// Drop every membership of `connection` and return the rooms it left.
    pub fn release(&self, connection: ConnectionId) -> Vec<Room> {
        let mut table = self.table.write();
        let Some(rooms) = table.memberships.remove(&connection) else {
            return Vec::new();
        };

        for room in &rooms {
            if let Some(members) = table.members.get_mut(room) {
                members.remove(&connection);
                if members.is_empty() {
                    table.members.remove(room);
                }
            }
        }

        rooms.into_iter().collect()
    }

    pub fn members(&self, room: Room) -> HashSet<ConnectionId> {
        self.table
            .read()
            .members
            .get(&room)
            .cloned()
            .unwrap_or_default()
    }

    /// Union of the members of `rooms`; each connection appears once.
    pub fn members_of_any(&self, rooms: &[Room]) -> HashSet<ConnectionId> {
        let table = self.table.read();
        rooms
            .iter()
            .filter_map(|room| table.members.get(room))
            .flatten()
            .copied()
            .collect()
    }

    pub fn rooms_of(&self, connection: ConnectionId) -> HashSet<Room> {
        self.table
            .read()
            .memberships
            .get(&connection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_member(&self, connection: ConnectionId, room: Room) -> bool {
        self.table
            .read()
            .members
            .get(&room)
            .is_some_and(|members| members.contains(&connection))
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.table.read().members.len()
    }
}
