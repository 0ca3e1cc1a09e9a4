//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! - **Room**: Name of a broadcast channel (`user:<id>` or `chat:<id>`)

mod room;

pub use room::Room;
