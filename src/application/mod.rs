//! Application Layer
//!
//! Contains the authentication and message services plus the wire DTOs
//! they exchange with the presentation layer.

pub mod dto;
pub mod services;
