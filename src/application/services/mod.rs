//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **ConnectionAuthenticator**: Handshake credential verification and user lookup
//! - **MessagePipeline**: Validation, persistence and enrichment of chat messages

pub mod auth_service;
pub mod message_service;

// Re-export auth service types
pub use auth_service::{AuthError, Claims, ConnectionAuthenticator, JwtVerifier, TokenVerifier};

// Re-export message pipeline types
pub use message_service::{Delivery, MessagePipeline, PipelineError};
