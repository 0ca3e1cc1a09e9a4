//! Broadcast room names.
//!
//! A connection always sits in its owner's personal room (`user:<id>`) and
//! may join any number of chat rooms (`chat:<id>`).

use std::fmt;

/// A named broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Room {
    /// Personal room reaching every connection of one user
    User(i64),
    /// Room for clients currently viewing a chat
    Chat(i64),
}

impl Room {
    pub fn user(user_id: i64) -> Self {
        Self::User(user_id)
    }

    pub fn chat(chat_id: i64) -> Self {
        Self::Chat(chat_id)
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id),
            Self::Chat(id) => write!(f, "chat:{}", id),
        }
    }
}
