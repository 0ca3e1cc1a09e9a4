//! Chat Repository Implementation
//!
//! PostgreSQL implementation of chat lookups with participant filtering.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Chat, ChatRepository};
use crate::shared::error::AppError;

/// PostgreSQL chat repository implementation.
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    /// Creates a new PgChatRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type; participants are aggregated into an array column.
#[derive(Debug, sqlx::FromRow)]
struct ChatRow {
    id: i64,
    participant_ids: Vec<i64>,
    last_message_id: Option<i64>,
    last_message_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ChatRow {
    fn into_chat(self) -> Chat {
        Chat {
            id: self.id,
            participant_ids: self.participant_ids,
            last_message_id: self.last_message_id,
            last_message_at: self.last_message_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    /// Load a chat together with its participant list, filtered on membership.
    async fn find_for_participant(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Option<Chat>, AppError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT c.id,
                   ARRAY(
                       SELECT p.user_id FROM chat_participants p
                       WHERE p.chat_id = c.id
                       ORDER BY p.user_id
                   ) AS participant_ids,
                   c.last_message_id, c.last_message_at, c.created_at, c.updated_at
            FROM chats c
            WHERE c.id = $1
              AND EXISTS (
                  SELECT 1 FROM chat_participants p
                  WHERE p.chat_id = c.id AND p.user_id = $2
              )
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_chat()))
    }

    /// Overwrite the last-message reference. Concurrent writers race; the
    /// last statement to commit wins.
    async fn update(&self, chat: &Chat) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE chats
            SET last_message_id = $2, last_message_at = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(chat.id)
        .bind(chat.last_message_id)
        .bind(chat.last_message_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Chat {} not found", chat.id)));
        }

        Ok(())
    }
}
