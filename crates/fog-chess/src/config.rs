//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for the game server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to. Default: 0.0.0.0:3001.
    pub listen_addr: SocketAddr,
    /// How long a finished game is kept so final messages can land.
    /// Default: 30s.
    pub grace_period: Duration,
    /// Largest accepted client frame in bytes. Default: 16 KiB.
    pub max_frame_bytes: usize,
}

impl ServerConfig {
    /// Validate the configuration, returning an error if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grace_period.is_zero() {
            return Err(ConfigError {
                reason: "grace_period must be > 0".to_string(),
            });
        }
        if self.max_frame_bytes < 64 {
            return Err(ConfigError {
                reason: format!(
                    "max_frame_bytes must be >= 64, got {}",
                    self.max_frame_bytes
                ),
            });
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            grace_period: Duration::from_secs(30),
            max_frame_bytes: 16 * 1024,
        }
    }
}
