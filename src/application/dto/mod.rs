//! Data Transfer Objects
//!
//! Wire payloads for real-time events.

pub mod message;

pub use message::{MessageView, SendMessageRequest, SenderSnapshot};
