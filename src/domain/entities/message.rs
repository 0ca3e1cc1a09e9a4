//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Represents a message sent in a chat.
///
/// Only references are stored; sender display data is resolved when the
/// message is broadcast.
///
/// Maps to the `messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - chat_id: BIGINT NOT NULL REFERENCES chats(id)
/// - sender_id: BIGINT NOT NULL REFERENCES users(id)
/// - text: TEXT NOT NULL
/// - created_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Chat the message belongs to
    pub chat_id: i64,

    /// Author user ID
    pub sender_id: i64,

    /// Message text
    pub text: String,

    /// Timestamp when the message was sent
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Message data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist a new message and return the stored row.
    async fn create(&self, message: &Message) -> Result<Message, AppError>;
}
