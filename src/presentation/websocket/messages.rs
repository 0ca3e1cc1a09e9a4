//! WebSocket Message Types
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": <payload>}`.
//! IDs travel as strings.

use serde::{Deserialize, Serialize};

use crate::application::dto::{MessageView, SendMessageRequest};
use crate::shared::snowflake::deserialize_id_string;

pub const CHAT_NOT_FOUND: &str = "Chat not found";
pub const SEND_FAILED: &str = "Failed to send message";
pub const INVALID_MESSAGE: &str = "Invalid message";
pub const UNKNOWN_EVENT: &str = "Unknown event";
pub const JOIN_FAILED: &str = "Failed to join chat";

/// Inbound client events
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinChat(#[serde(deserialize_with = "deserialize_id_string")] String),
    LeaveChat(#[serde(deserialize_with = "deserialize_id_string")] String),
    SendMessage(SendMessageRequest),
    /// Typing indicator; accepted and ignored
    Typing(Option<serde_json::Value>),
}

/// Outbound server events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent once to a new connection
    OnlineUsers {
        #[serde(rename = "userIds")]
        user_ids: Vec<String>,
    },
    UserOnline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    UserOffline {
        #[serde(rename = "userId")]
        user_id: String,
    },
    NewMessage(MessageView),
    /// Sender-scoped failure notice
    SocketError { message: String },
}

impl ServerEvent {
    pub fn online_users(user_ids: &[i64]) -> Self {
        Self::OnlineUsers {
            user_ids: user_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub fn user_online(user_id: i64) -> Self {
        Self::UserOnline {
            user_id: user_id.to_string(),
        }
    }

    pub fn user_offline(user_id: i64) -> Self {
        Self::UserOffline {
            user_id: user_id.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::SocketError {
            message: message.into(),
        }
    }

    /// Wire name of the event
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::OnlineUsers { .. } => "online-users",
            ServerEvent::UserOnline { .. } => "user-online",
            ServerEvent::UserOffline { .. } => "user-offline",
            ServerEvent::NewMessage(_) => "new-message",
            ServerEvent::SocketError { .. } => "socket-error",
        }
    }
}
