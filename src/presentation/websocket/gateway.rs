//! WebSocket Gateway
//!
//! Owns the live connection table together with presence and room
//! membership, and fans events out to connections.
//!
//! Connects and disconnects are serialized by one lifecycle lock, so the
//! online snapshot a new connection receives and the presence broadcasts
//! around it never interleave.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::messages::ServerEvent;
use super::presence::PresenceRegistry;
use super::rooms::RoomRouter;
use super::ConnectionId;
use crate::domain::Room;
use crate::infrastructure::metrics;

/// A serialized event, shared by every recipient of one broadcast
pub type OutboundFrame = Arc<str>;

/// Outbound side of a live connection
struct ConnectedSocket {
    user_id: i64,
    sender: mpsc::UnboundedSender<OutboundFrame>,
}

/// Real-time hub shared by all connections
#[derive(Default)]
pub struct Gateway {
    /// Active connections by connection id
    connections: DashMap<ConnectionId, ConnectedSocket>,
    presence: PresenceRegistry,
    rooms: RoomRouter,
    /// Held for a whole connect or disconnect sequence; never across an await
    lifecycle: Mutex<()>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn rooms(&self) -> &RoomRouter {
        &self.rooms
    }

    /// Bring a connection online.
    ///
    /// Queues the online snapshot (taken before this connection registers),
    /// then attaches, registers and joins `user:<id>`, and announces the user
    /// to everyone else if it was offline. Returns whether it was offline.
    pub fn connect(
        &self,
        connection: ConnectionId,
        user_id: i64,
        sender: mpsc::UnboundedSender<OutboundFrame>,
    ) -> bool {
        let _lifecycle = self.lifecycle.lock();

        if let Some(frame) = encode(&ServerEvent::online_users(&self.presence.snapshot())) {
            let _ = sender.send(frame);
        }

        self.attach(connection, user_id, sender);
        let newly_online = self.presence.register(user_id, connection);
        self.rooms.join(connection, Room::user(user_id));

        if newly_online {
            self.broadcast_except(connection, &ServerEvent::user_online(user_id));
        }

        self.update_gauges();
        newly_online
    }

    /// Take a connection offline: release its rooms, detach it, and announce
    /// the user as offline if this was its registered connection. Returns
    /// whether the user went offline.
    pub fn disconnect(&self, connection: ConnectionId, user_id: i64) -> bool {
        let _lifecycle = self.lifecycle.lock();

        self.rooms.release(connection);
        self.detach(connection);

        let went_offline = self.presence.unregister(user_id, connection);
        if went_offline {
            self.broadcast_except(connection, &ServerEvent::user_offline(user_id));
        }

        self.update_gauges();
        went_offline
    }

    fn update_gauges(&self) {
        metrics::set_realtime_gauges(self.connections.len(), self.presence.len());
    }

    /// Make a connection reachable by broadcasts
    fn attach(
        &self,
        connection: ConnectionId,
        user_id: i64,
        sender: mpsc::UnboundedSender<OutboundFrame>,
    ) {
        self.connections
            .insert(connection, ConnectedSocket { user_id, sender });

        tracing::debug!(user_id, connection_id = %connection, "Connection attached");
    }

    /// Remove a connection; returns its user id if it was attached
    fn detach(&self, connection: ConnectionId) -> Option<i64> {
        self.connections
            .remove(&connection)
            .map(|(_, socket)| socket.user_id)
    }

    /// Send an event to one connection
    pub fn send_to_connection(&self, connection: ConnectionId, event: &ServerEvent) -> bool {
        let Some(frame) = encode(event) else {
            return false;
        };
        self.push(connection, &frame)
    }

    /// Send an event to every connection except `except`
    pub fn broadcast_except(&self, except: ConnectionId, event: &ServerEvent) -> usize {
        let Some(frame) = encode(event) else {
            return 0;
        };

        let mut delivered = 0;
        for entry in self.connections.iter() {
            if *entry.key() != except && entry.value().sender.send(frame.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Send an event once to every connection in any of `rooms`
    pub fn send_to_rooms(&self, rooms: &[Room], event: &ServerEvent) -> usize {
        let Some(frame) = encode(event) else {
            return 0;
        };

        self.rooms
            .members_of_any(rooms)
            .into_iter()
            .filter(|connection| self.push(*connection, &frame))
            .count()
    }

    /// Get connection count
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn push(&self, connection: ConnectionId, frame: &OutboundFrame) -> bool {
        // A closed queue means the socket is going away; not an error.
        self.connections
            .get(&connection)
            .is_some_and(|socket| socket.sender.send(frame.clone()).is_ok())
    }
}

/// Serialize an event into a shareable text frame
fn encode(event: &ServerEvent) -> Option<OutboundFrame> {
    match serde_json::to_string(event) {
        Ok(text) => Some(Arc::from(text)),
        Err(e) => {
            tracing::error!(event = event.event_name(), error = %e, "Failed to serialize event");
            None
        }
    }
}
