//! HTTP Handlers
//!
//! Request handlers for operational endpoints.

pub mod health;
