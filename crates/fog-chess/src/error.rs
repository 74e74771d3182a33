//! Error types for the rules engine, game sessions and server startup.

use crate::types::{Color, GameId, GameStatus, MoveRequest};

/// Errors raised by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    /// Invalid FEN string.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// The move cannot be physically carried out on this board.
    #[error("illegal move {request}: {reason}")]
    IllegalMove {
        request: MoveRequest,
        reason: &'static str,
    },
}

/// Errors raised by a game session when handling a player's request.
///
/// None of these mutate the board. The lobby reports them to the requesting
/// player only, except `UnknownSession`, which it swallows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The requester does not own the side to move.
    #[error("not your turn - it is {expected}'s turn")]
    NotYourTurn { expected: Color },

    /// The move is not in the pseudo-legal move set.
    #[error("invalid move: {request}")]
    InvalidMove { request: MoveRequest },

    /// The generator accepted a move the applier could not execute.
    #[error("move failed: {0}")]
    MoveFailed(#[source] ChessError),

    /// No session with this id.
    #[error("unknown game {game_id}")]
    UnknownSession { game_id: GameId },

    /// The requester is not seated in this game.
    #[error("player is not in this game")]
    NotInGame,

    /// The game already has a final result.
    #[error("game is already over: {status}")]
    GameOver { status: GameStatus },
}

impl GameError {
    /// Text sent to the client in an `error` message.
    #[must_use]
    pub fn player_message(&self) -> &'static str {
        match self {
            Self::NotYourTurn { .. } | Self::NotInGame => "Not your turn",
            Self::InvalidMove { .. } => "Invalid move",
            Self::MoveFailed(_) => "Move failed",
            Self::UnknownSession { .. } => "Unknown game",
            Self::GameOver { .. } => "Game is over",
        }
    }

    /// Whether the lobby drops this error instead of answering.
    #[must_use]
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::UnknownSession { .. })
    }
}

/// Invalid server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {reason}")]
pub struct ConfigError {
    pub reason: String,
}

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Serve(#[source] std::io::Error),
}
