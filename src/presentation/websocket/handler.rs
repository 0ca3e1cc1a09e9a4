//! WebSocket Connection Handler
//!
//! Upgrades authenticated requests and drives one socket: a writer task
//! drains the outbound queue, a reader task feeds the session.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::gateway::OutboundFrame;
use super::session::{Session, SessionServices};
use crate::domain::User;
use crate::presentation::http::extractors::AuthenticatedUser;
use crate::startup::AppState;

/// WebSocket upgrade handler.
///
/// Authentication runs in the extractor, so a bad credential is answered
/// with 401 before any upgrade or registration.
pub async fn ws_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ws: WebSocketUpgrade,
) -> Response {
    let ws_settings = &state.settings.websocket;
    let services = state.realtime.clone();

    ws.max_message_size(ws_settings.max_message_size)
        .max_frame_size(ws_settings.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, services, user))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, services: SessionServices, user: User) {
    // Split socket for concurrent read/write
    let (mut sink, mut stream) = socket.split();

    // Create channel for outgoing frames
    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundFrame>();

    let session = Session::open(services, user.id, tx);
    let connection_id = session.id();

    // Spawn task to forward frames from channel to WebSocket
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sink.send(Message::Text(frame.as_ref().into())).await.is_err() {
                break;
            }
        }
    });

    // The reader owns the session so that aborting it runs cleanup
    let mut reader = tokio::spawn(async move {
        while let Some(msg) = stream.next().await {
            match msg {
                Ok(Message::Text(text)) => session.handle_text(text.as_str()).await,
                Ok(Message::Binary(_)) => session.reject_unrecognized(),
                Ok(Message::Close(_)) => break,
                Ok(_) => {
                    // Ping/pong are answered by axum
                }
                Err(e) => {
                    tracing::debug!(connection_id = %session.id(), error = %e, "WebSocket error");
                    break;
                }
            }
        }
        drop(session);
    });

    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    tracing::debug!(
        user_id = user.id,
        connection_id = %connection_id,
        "Connection closed"
    );
}
