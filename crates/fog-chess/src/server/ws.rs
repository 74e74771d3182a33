//! HTTP routes: the game WebSocket and a health check.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::hub::{HubHandle, HubStats};
use crate::protocol::{ClientMessage, ServerMessage};

/// Shared application state.
pub struct AppState {
    /// Handle to the hub task.
    pub hub: HubHandle,
    /// Largest accepted client frame.
    pub max_frame_bytes: usize,
    /// Fires on shutdown so open sockets close.
    pub cancel: CancellationToken,
}

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status string.
    pub status: String,
    /// Open connections.
    pub connections: usize,
    /// Games held, finished ones in their grace window included.
    pub games: usize,
}

/// Create the HTTP router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let stats = state.hub.stats().await;
    let HubStats {
        connections, games, ..
    } = stats.unwrap_or(HubStats {
        connections: 0,
        games: 0,
        matches_made: 0,
    });
    Json(HealthResponse {
        status: if stats.is_some() { "ok" } else { "stopping" }.to_string(),
        connections,
        games,
    })
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.max_message_size(state.max_frame_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let Some(connection) = state.hub.connect() else {
        return;
    };
    let player = connection.player;
    let replies = connection.outbox;
    let mut inbox = connection.inbox;
    tracing::info!(player = %player, "player connected");

    let (mut sender, mut receiver) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "failed to encode server message");
                    continue;
                }
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
    });

    loop {
        let frame = tokio::select! {
            _ = state.cancel.cancelled() => break,
            _ = &mut writer => break,
            frame = receiver.next() => frame,
        };
        let text = match frame {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                tracing::debug!(player = %player, error = %e, "socket error");
                break;
            }
        };
        match ClientMessage::parse(&text) {
            Ok(message) => {
                if !state.hub.send(player, message) {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!(player = %player, error = %e, "malformed frame");
                let _ = replies.send(ServerMessage::error("Malformed message"));
            }
        }
    }

    state.hub.disconnect(player);
    drop(replies);
    writer.abort();
    tracing::info!(player = %player, "player disconnected");
}
