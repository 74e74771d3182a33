//! Game-related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::chess::Color;

/// Unique identifier for a chess game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(Uuid);

impl GameId {
    /// Create a new random game ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Final status of a finished game.
///
/// A running game has no status; see `session::Phase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// White player won.
    WhiteWins,
    /// Black player won.
    BlackWins,
    /// Game ended in a draw.
    Draw,
}

impl GameStatus {
    /// The status for a win by `color`.
    #[must_use]
    pub const fn won_by(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWins,
            Color::Black => Self::BlackWins,
        }
    }

    /// Returns the winning color if any.
    #[must_use]
    pub const fn winner(&self) -> Option<Color> {
        match self {
            Self::WhiteWins => Some(Color::White),
            Self::BlackWins => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WhiteWins => write!(f, "white_wins"),
            Self::BlackWins => write!(f, "black_wins"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// Reason why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// A king was taken off the board.
    KingCaptured,
    /// Side to move had no pseudo-legal moves.
    Stalemate,
    /// Hundred half-moves without a pawn move or capture.
    FiftyMoveRule,
    /// Same position reached three times.
    ThreefoldRepetition,
    /// Neither side can capture a king with what is left.
    InsufficientMaterial,
    /// A player resigned.
    Resignation,
    /// A player's connection went away.
    Disconnect,
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KingCaptured => write!(f, "king_captured"),
            Self::Stalemate => write!(f, "stalemate"),
            Self::FiftyMoveRule => write!(f, "fifty_move_rule"),
            Self::ThreefoldRepetition => write!(f, "threefold_repetition"),
            Self::InsufficientMaterial => write!(f, "insufficient_material"),
            Self::Resignation => write!(f, "resignation"),
            Self::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// Final result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnd {
    /// Final status.
    pub status: GameStatus,
    /// Why the game ended.
    pub reason: GameResult,
}

impl GameEnd {
    /// A decisive result in favour of `winner`.
    #[must_use]
    pub const fn win(winner: Color, reason: GameResult) -> Self {
        Self {
            status: GameStatus::won_by(winner),
            reason,
        }
    }

    /// A drawn result.
    #[must_use]
    pub const fn draw(reason: GameResult) -> Self {
        Self {
            status: GameStatus::Draw,
            reason,
        }
    }

    /// The winning color, if the game was decisive.
    #[must_use]
    pub const fn winner(&self) -> Option<Color> {
        self.status.winner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_id_roundtrip() {
        let id = GameId::new();
        let s = id.to_string();
        let parsed: GameId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_game_status_helpers() {
        assert_eq!(GameStatus::WhiteWins.winner(), Some(Color::White));
        assert_eq!(GameStatus::BlackWins.winner(), Some(Color::Black));
        assert_eq!(GameStatus::Draw.winner(), None);
        assert_eq!(GameStatus::won_by(Color::Black), GameStatus::BlackWins);
    }

    #[test]
    fn test_game_end_constructors() {
        let end = GameEnd::win(Color::White, GameResult::KingCaptured);
        assert_eq!(end.winner(), Some(Color::White));
        assert_eq!(end.reason, GameResult::KingCaptured);

        let end = GameEnd::draw(GameResult::Stalemate);
        assert_eq!(end.status, GameStatus::Draw);
        assert_eq!(end.winner(), None);
    }

    #[test]
    fn test_game_result_display() {
        assert_eq!(GameResult::KingCaptured.to_string(), "king_captured");
        assert_eq!(
            serde_json::to_string(&GameResult::ThreefoldRepetition).unwrap(),
            "\"threefold_repetition\""
        );
    }
}
