//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Active WebSocket connection gauge
//! - Online user gauge
//! - Delivered message counter
//! - Socket error counter by kind

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Open WebSocket connections
pub static CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("chat_backend"),
    )
    .expect("Failed to create CONNECTIONS_ACTIVE metric")
});

/// Users with a live presence entry
pub static ONLINE_USERS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("online_users", "Number of users currently online").namespace("chat_backend"),
    )
    .expect("Failed to create ONLINE_USERS metric")
});

/// Messages persisted and broadcast
pub static MESSAGES_SENT: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_sent_total", "Total number of messages delivered")
            .namespace("chat_backend"),
    )
    .expect("Failed to create MESSAGES_SENT metric")
});

/// Socket errors emitted to clients
pub static SOCKET_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("socket_errors_total", "Total number of socket errors sent to clients")
            .namespace("chat_backend"),
        &["kind"], // "chat_not_found", "invalid_message", "send_failed", ...
    )
    .expect("Failed to create SOCKET_ERRORS metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(ONLINE_USERS.clone()))
        .expect("Failed to register ONLINE_USERS");
    registry
        .register(Box::new(MESSAGES_SENT.clone()))
        .expect("Failed to register MESSAGES_SENT");
    registry
        .register(Box::new(SOCKET_ERRORS.clone()))
        .expect("Failed to register SOCKET_ERRORS");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to update connection and presence gauges
pub fn set_realtime_gauges(connections: usize, online_users: usize) {
    CONNECTIONS_ACTIVE.set(connections as i64);
    ONLINE_USERS.set(online_users as i64);
}

/// Helper to count a delivered message
pub fn record_message_sent() {
    MESSAGES_SENT.inc();
}

/// Helper to count a socket error by kind
pub fn record_socket_error(kind: &str) {
    SOCKET_ERRORS.with_label_values(&[kind]).inc();
}
