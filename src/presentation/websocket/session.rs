//! WebSocket Session
//!
//! Per-connection state machine: presence and room bookkeeping on open and
//! close, plus dispatch of inbound events. Events of one connection are
//! handled one at a time, in arrival order.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::gateway::{Gateway, OutboundFrame};
use super::messages::{
    ClientEvent, ServerEvent, CHAT_NOT_FOUND, INVALID_MESSAGE, JOIN_FAILED, SEND_FAILED,
    UNKNOWN_EVENT,
};
use super::ConnectionId;
use crate::application::services::{MessagePipeline, PipelineError};
use crate::domain::{ChatRepository, Room};
use crate::infrastructure::metrics;
use crate::shared::snowflake::parse_id;

/// Shared collaborators for every session
#[derive(Clone)]
pub struct SessionServices {
    pub gateway: Arc<Gateway>,
    pub pipeline: Arc<MessagePipeline>,
    pub chats: Arc<dyn ChatRepository>,
    /// Check chat participation before joining `chat:<id>`
    pub authorize_chat_joins: bool,
}

/// One authenticated connection.
///
/// Dropping the session releases its rooms and presence entry.
pub struct Session {
    id: ConnectionId,
    user_id: i64,
    services: SessionServices,
    closed: bool,
}

impl Session {
    /// Register a freshly authenticated connection.
    ///
    /// The online snapshot is taken before this connection registers and is
    /// queued ahead of any broadcast it could receive.
    pub fn open(
        services: SessionServices,
        user_id: i64,
        sender: mpsc::UnboundedSender<OutboundFrame>,
    ) -> Self {
        let id = Uuid::new_v4();
        let newly_online = services.gateway.connect(id, user_id, sender);
        tracing::info!(user_id, connection_id = %id, newly_online, "User connected");

        Self {
            id,
            user_id,
            services,
            closed: false,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Handle one inbound text frame.
    pub async fn handle_text(&self, text: &str) {
        match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => self.handle(event).await,
            Err(e) => {
                tracing::debug!(connection_id = %self.id, error = %e, "Unrecognized frame");
                self.reject_unrecognized();
            }
        }
    }

    /// Answer a frame that is not a known client event.
    pub fn reject_unrecognized(&self) {
        self.reject("unknown_event", UNKNOWN_EVENT);
    }

    pub async fn handle(&self, event: ClientEvent) {
        match event {
            ClientEvent::JoinChat(chat_id) => self.join_chat(&chat_id).await,
            ClientEvent::LeaveChat(chat_id) => self.leave_chat(&chat_id),
            ClientEvent::Typing(_) => {
                tracing::trace!(user_id = self.user_id, "Typing indicator ignored");
            }
            ClientEvent::SendMessage(request) => {
                match self.services.pipeline.send(self.user_id, request).await {
                    Ok(delivery) => {
                        let event = ServerEvent::NewMessage(delivery.view);
                        let delivered = self.services.gateway.send_to_rooms(&delivery.rooms, &event);
                        metrics::record_message_sent();
                        tracing::debug!(
                            user_id = self.user_id,
                            delivered,
                            "Message broadcast"
                        );
                    }
                    Err(e) => {
                        let message = match &e {
                            PipelineError::InvalidMessage(_) => INVALID_MESSAGE,
                            PipelineError::ChatNotFound => CHAT_NOT_FOUND,
                            PipelineError::SendFailed(source) => {
                                tracing::error!(
                                    user_id = self.user_id,
                                    error = %source,
                                    "Failed to send message"
                                );
                                SEND_FAILED
                            }
                        };
                        self.reject(e.kind(), message);
                    }
                }
            }
        }
    }

    async fn join_chat(&self, raw_id: &str) {
        let Some(chat_id) = parse_id(raw_id) else {
            self.reject("chat_not_found", CHAT_NOT_FOUND);
            return;
        };

        if self.services.authorize_chat_joins {
            match self
                .services
                .chats
                .find_for_participant(chat_id, self.user_id)
                .await
            {
                Ok(Some(_)) => {}
                Ok(None) => {
                    self.reject("chat_not_found", CHAT_NOT_FOUND);
                    return;
                }
                Err(e) => {
                    tracing::error!(user_id = self.user_id, chat_id, error = %e, "Chat lookup failed");
                    self.reject("join_failed", JOIN_FAILED);
                    return;
                }
            }
        }

        let room = Room::chat(chat_id);
        self.services.gateway.rooms().join(self.id, room);
        tracing::debug!(user_id = self.user_id, room = %room, "Joined room");
    }

    fn leave_chat(&self, raw_id: &str) {
        if let Some(chat_id) = parse_id(raw_id) {
            let room = Room::chat(chat_id);
            if self.services.gateway.rooms().leave(self.id, room) {
                tracing::debug!(user_id = self.user_id, room = %room, "Left room");
            }
        }
    }

    fn reject(&self, kind: &str, message: &str) {
        metrics::record_socket_error(kind);
        self.services
            .gateway
            .send_to_connection(self.id, &ServerEvent::error(message));
    }

    /// Release rooms and presence. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let went_offline = self.services.gateway.disconnect(self.id, self.user_id);
        tracing::info!(
            user_id = self.user_id,
            connection_id = %self.id,
            went_offline,
            "User disconnected"
        );
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
