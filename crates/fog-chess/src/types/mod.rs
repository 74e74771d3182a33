//! Type definitions for the fog chess server.
//!
//! ## Modules
//!
//! - `chess` - Chess types wrapping shakmaty (Color, Square, Move, etc.)
//! - `game` - Game-related types (GameId, GameStatus, GameResult)
//! - `player` - Player-related types (PlayerId)

pub mod chess;
pub mod game;
pub mod player;

// Re-export commonly used types
pub use chess::{Color, Move, MoveRequest, Piece, PieceType, Square};
pub use game::{GameEnd, GameId, GameResult, GameStatus};
pub use player::PlayerId;
