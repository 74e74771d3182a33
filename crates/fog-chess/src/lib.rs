//! # Fog Chess
//!
//! A two-player fog-of-war chess server where the check rule is off and the
//! game is won by capturing the enemy king.
//!
//! ## Layout
//!
//! - **Rules engine** (`chess`): pseudo-legal moves, move application and
//!   terminal detection on top of shakmaty's board and attack tables
//! - **Fog** (`fog`): what each color may see
//! - **Sessions** (`session`): games, the matchmaking slot and the lobby
//! - **Server** (`server`): hub task and axum WebSocket endpoint

pub mod chess;
pub mod config;
pub mod error;
pub mod fog;
pub mod protocol;
pub mod server;
pub mod session;
pub mod types;

pub use config::ServerConfig;
pub use error::{ChessError, ConfigError, GameError, ServerError};
