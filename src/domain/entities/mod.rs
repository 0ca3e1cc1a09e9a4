//! # Domain Entities
//!
//! Persisted business objects the real-time layer reads and writes.
//!
//! - **User**: Account provisioned by the auth-callback flow (read-only here)
//! - **Chat**: A conversation with a fixed participant list
//! - **Message**: A text message sent in a chat
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod chat;
mod message;
mod user;

pub use chat::{Chat, ChatRepository};
pub use message::{Message, MessageRepository, MAX_MESSAGE_LENGTH};
pub use user::{User, UserRepository};

#[cfg(test)]
pub use chat::MockChatRepository;
#[cfg(test)]
pub use message::MockMessageRepository;
#[cfg(test)]
pub use user::MockUserRepository;
