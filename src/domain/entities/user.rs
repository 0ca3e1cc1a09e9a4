//! User entity and repository trait.
//!
//! Maps to the `users` table. Users are provisioned by the auth-callback
//! flow outside this service; here they are only ever read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a user account in the chat system.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - external_id: TEXT NOT NULL UNIQUE (identity provider subject)
/// - name: TEXT NOT NULL
/// - email: TEXT NULL
/// - avatar_url: TEXT NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// - updated_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Subject of the identity provider's session tokens
    pub external_id: String,

    /// Display name
    pub name: String,

    /// Primary email address
    pub email: Option<String>,

    /// URL to the user's avatar image
    pub avatar_url: Option<String>,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            external_id: String::new(),
            name: String::new(),
            email: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual database interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by the identity provider subject they were provisioned with.
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError>;
}
