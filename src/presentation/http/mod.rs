//! HTTP Surface
//!
//! Router, extractors and operational handlers.

pub mod extractors;
pub mod handlers;
pub mod routes;
