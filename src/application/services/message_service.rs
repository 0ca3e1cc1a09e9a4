//! Message Pipeline
//!
//! Validates, persists and enriches a chat message. Delivery to sockets is
//! left to the caller, which receives the view together with the rooms it
//! must reach.
//!
//! The steps are not transactional: a message that was stored before the
//! chat update failed stays in place and is only logged.

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::application::dto::{MessageView, SendMessageRequest};
use crate::domain::{ChatRepository, Message, MessageRepository, Room, UserRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::{parse_id, SnowflakeGenerator};
use crate::shared::validation::first_error_message;

/// Send pipeline errors; all are reported to the sender only.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Chat not found")]
    ChatNotFound,

    #[error("Failed to send message: {0}")]
    SendFailed(#[source] AppError),
}

impl PipelineError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidMessage(_) => "invalid_message",
            PipelineError::ChatNotFound => "chat_not_found",
            PipelineError::SendFailed(_) => "send_failed",
        }
    }
}

/// Outcome of a successful send
#[derive(Debug, Clone)]
pub struct Delivery {
    pub view: MessageView,
    /// `chat:<id>` followed by `user:<p>` for every participant
    pub rooms: Vec<Room>,
}

pub struct MessagePipeline {
    chats: Arc<dyn ChatRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl MessagePipeline {
    pub fn new(
        chats: Arc<dyn ChatRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            chats,
            messages,
            users,
            id_generator,
        }
    }

    /// Run one send for `sender_id`.
    pub async fn send(
        &self,
        sender_id: i64,
        request: SendMessageRequest,
    ) -> Result<Delivery, PipelineError> {
        request
            .validate()
            .map_err(|e| PipelineError::InvalidMessage(first_error_message(&e)))?;
        if request.text.trim().is_empty() {
            return Err(PipelineError::InvalidMessage("text: must not be blank".into()));
        }

        let chat_id = parse_id(&request.chat_id).ok_or(PipelineError::ChatNotFound)?;

        let mut chat = self
            .chats
            .find_for_participant(chat_id, sender_id)
            .await
            .map_err(PipelineError::SendFailed)?
            .ok_or(PipelineError::ChatNotFound)?;

        let message = self
            .messages
            .create(&Message {
                id: self.id_generator.generate(),
                chat_id: chat.id,
                sender_id,
                text: request.text,
                created_at: Utc::now(),
            })
            .await
            .map_err(PipelineError::SendFailed)?;

        chat.record_last_message(&message);
        if let Err(e) = self.chats.update(&chat).await {
            tracing::warn!(
                message_id = message.id,
                chat_id = chat.id,
                error = %e,
                "Message stored but chat update failed"
            );
            return Err(PipelineError::SendFailed(e));
        }

        let sender = self
            .users
            .find_by_id(sender_id)
            .await
            .map_err(PipelineError::SendFailed)?;
        if sender.is_none() {
            tracing::debug!(sender_id, "Sender record missing, broadcasting id-only snapshot");
        }

        let view = MessageView::new(&message, sender.as_ref());

        let rooms = std::iter::once(Room::chat(chat.id))
            .chain(chat.participant_ids.iter().map(|&p| Room::user(p)))
            .collect();

        Ok(Delivery { view, rooms })
    }
}
