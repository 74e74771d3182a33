//! Network side of the game server.
//!
//! - `hub` - single task owning the lobby, fed by an event channel
//! - `ws` - axum routes for the game socket and health check

pub mod hub;
pub mod ws;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

pub use hub::{Connection, Hub, HubEvent, HubHandle, HubStats};
pub use ws::{create_router, AppState, HealthResponse};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::fog::LineOfSight;
use crate::session::lobby::Lobby;

/// Start the hub task and return a handle to it.
pub fn spawn_hub(config: &ServerConfig, cancel: CancellationToken) -> HubHandle {
    let (hub, handle) = Hub::new(Lobby::new(LineOfSight), config.grace_period, cancel);
    tokio::spawn(hub.run());
    handle
}

/// Serve until `cancel` fires.
pub async fn run(config: ServerConfig, cancel: CancellationToken) -> Result<(), ServerError> {
    config.validate()?;

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.listen_addr,
            source,
        })?;
    tracing::info!(addr = %config.listen_addr, "listening");

    let hub = spawn_hub(&config, cancel.clone());
    let state = Arc::new(AppState {
        hub,
        max_frame_bytes: config.max_frame_bytes,
        cancel: cancel.clone(),
    });

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("server stopped");
    Ok(())
}
