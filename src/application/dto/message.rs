//! Message DTOs
//!
//! Payloads carried by the `send-message` and `new-message` events.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Message, User, MAX_MESSAGE_LENGTH};
use crate::shared::snowflake::deserialize_id_string;

/// Length bound in the integer type the length validator compares against
const MAX_TEXT_CHARS: u64 = MAX_MESSAGE_LENGTH as u64;

/// Inbound `send-message` payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[serde(rename = "chatId", deserialize_with = "deserialize_id_string")]
    pub chat_id: String,

    #[validate(length(
        min = 1,
        max = MAX_TEXT_CHARS,
        message = "Message text is empty or too long"
    ))]
    pub text: String,
}

/// Display attributes of a message author, resolved at send time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderSnapshot {
    pub id: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

impl SenderSnapshot {
    /// Snapshot for a sender whose user record could not be loaded
    pub fn id_only(sender_id: i64) -> Self {
        Self {
            id: sender_id.to_string(),
            name: None,
            avatar: None,
        }
    }
}

impl From<&User> for SenderSnapshot {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: Some(user.name.clone()),
            avatar: user.avatar_url.clone(),
        }
    }
}

/// Enriched message broadcast as `new-message`.
///
/// Never persisted; built per send from the stored message and the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub chat: String,
    pub sender: SenderSnapshot,
    pub text: String,
    pub created_at: String,
}

impl MessageView {
    pub fn new(message: &Message, sender: Option<&User>) -> Self {
        Self {
            id: message.id.to_string(),
            chat: message.chat_id.to_string(),
            sender: sender
                .map(SenderSnapshot::from)
                .unwrap_or_else(|| SenderSnapshot::id_only(message.sender_id)),
            text: message.text.clone(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}
