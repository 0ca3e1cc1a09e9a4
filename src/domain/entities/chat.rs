//! Chat entity and repository trait.
//!
//! Maps to the `chats` and `chat_participants` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Message;
use crate::shared::error::AppError;

/// A conversation between a fixed set of participants.
///
/// Maps to the `chats` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - last_message_id: BIGINT NULL REFERENCES messages(id)
/// - last_message_at: TIMESTAMPTZ NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// Participants come from `chat_participants (chat_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// User IDs of every participant
    pub participant_ids: Vec<i64>,

    /// Most recent message, if any
    pub last_message_id: Option<i64>,

    /// Timestamp of the most recent message
    pub last_message_at: Option<DateTime<Utc>>,

    /// Chat creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    /// Check whether a user takes part in this chat.
    pub fn has_participant(&self, user_id: i64) -> bool {
        self.participant_ids.contains(&user_id)
    }

    /// Point the chat at a message that has already been persisted.
    pub fn record_last_message(&mut self, message: &Message) {
        self.last_message_id = Some(message.id);
        self.last_message_at = Some(message.created_at);
    }
}

impl Default for Chat {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            participant_ids: Vec::new(),
            last_message_id: None,
            last_message_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for Chat data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find a chat by ID, but only if `user_id` is one of its participants.
    ///
    /// Returns `None` both when the chat does not exist and when the user is
    /// not a participant, so callers cannot tell the two apart.
    async fn find_for_participant(&self, chat_id: i64, user_id: i64)
        -> Result<Option<Chat>, AppError>;

    /// Write the chat's last-message reference.
    async fn update(&self, chat: &Chat) -> Result<(), AppError>;
}
