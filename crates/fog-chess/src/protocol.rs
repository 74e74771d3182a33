//! JSON messages exchanged with clients.
//!
//! Every frame is an object tagged by `type` (snake_case). Payload fields are
//! camelCase.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::fog::FilteredBoard;
use crate::types::chess::{Color, MoveRequest, Piece, PieceType, Square};
use crate::types::game::{GameId, GameResult};

/// A request from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Join the queue, or leave it if already waiting.
    FindGame,
    /// Play a move.
    MakeMove {
        game_id: GameId,
        from: Square,
        to: Square,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        promotion: Option<PieceType>,
    },
    /// Give up the game.
    Resign { game_id: GameId },
}

impl ClientMessage {
    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The move carried by a `make_move` message.
    #[must_use]
    pub fn move_request(&self) -> Option<(GameId, MoveRequest)> {
        match *self {
            Self::MakeMove {
                game_id,
                from,
                to,
                promotion,
            } => Some((game_id, MoveRequest { from, to, promotion })),
            _ => None,
        }
    }
}

/// A message to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Queued, no opponent yet.
    Waiting,
    /// The search was withdrawn by a repeat `find_game`.
    SearchCancelled,
    /// Paired. Sent to each player with their own view.
    GameStart {
        game_id: GameId,
        color: Color,
        board: FilteredBoard,
        visible_squares: BTreeSet<Square>,
        turn: Color,
    },
    /// A move was played. Sent to each player with their own view.
    MoveMade {
        #[serde(rename = "move")]
        played: MoveSummary,
        turn: Color,
        is_game_over: bool,
        /// Set when a king was captured.
        is_checkmate: bool,
        is_stalemate: bool,
        is_draw: bool,
        winner: Option<Color>,
        board: FilteredBoard,
        visible_squares: BTreeSet<Square>,
    },
    /// The game ended off the board.
    GameOver {
        reason: GameOverReason,
        winner: Color,
    },
    /// A request was refused.
    Error { message: String },
}

impl ServerMessage {
    /// An `error` frame with `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Encode as a text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// The move inside `move_made`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSummary {
    pub from: Square,
    pub to: Square,
    /// Piece the pawn became, if it promoted.
    pub promotion: Option<PieceType>,
    pub captured: Option<Piece>,
}

/// Why a `game_over` was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Resign,
    Disconnect,
}

impl GameOverReason {
    /// The reason for a forfeit result, if it is one.
    #[must_use]
    pub const fn from_result(result: GameResult) -> Option<Self> {
        match result {
            GameResult::Resignation => Some(Self::Resign),
            GameResult::Disconnect => Some(Self::Disconnect),
            _ => None,
        }
    }
}
