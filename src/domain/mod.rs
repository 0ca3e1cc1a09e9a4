//! # Domain Layer
//!
//! Core business types of the chat backend, independent of transport and
//! storage concerns.
//!
//! ## Structure
//!
//! - **entities**: Persisted objects (User, Chat, Message) and their repository traits
//! - **value_objects**: Immutable value types (Room)
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Repository traits define data access contracts

pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
