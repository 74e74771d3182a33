//! Terminal-state detection for the king-capture variant.
//!
//! There is no checkmate search. A game is won by taking the king; a side
//! that cannot move at all is stalemated; the ordinary draw rules still apply.

use serde::{Deserialize, Serialize};

use super::board::BoardState;
use super::movegen::pseudo_legal_moves;
use crate::types::chess::{Color, PieceType};
use crate::types::game::{GameEnd, GameResult};

/// Half-moves without a pawn move or capture that end the game.
pub const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Occurrences of one position that end the game.
pub const REPETITION_LIMIT: u32 = 3;

/// How a game ended on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The given color took the opposing king.
    KingCaptured(Color),
    /// The side to move has no pseudo-legal moves.
    Stalemate,
    /// A standard draw rule holds.
    Draw(DrawRule),
}

/// Standard draw rules checked after every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawRule {
    /// Neither side has material to capture a king with.
    InsufficientMaterial,
    /// Hundred half-moves without progress.
    FiftyMoveRule,
    /// Same position for the third time.
    ThreefoldRepetition,
}

impl Outcome {
    /// Convert the outcome into a final game result.
    #[must_use]
    pub fn to_game_end(self) -> GameEnd {
        match self {
            Self::KingCaptured(winner) => GameEnd::win(winner, GameResult::KingCaptured),
            Self::Stalemate => GameEnd::draw(GameResult::Stalemate),
            Self::Draw(DrawRule::InsufficientMaterial) => {
                GameEnd::draw(GameResult::InsufficientMaterial)
            }
            Self::Draw(DrawRule::FiftyMoveRule) => GameEnd::draw(GameResult::FiftyMoveRule),
            Self::Draw(DrawRule::ThreefoldRepetition) => {
                GameEnd::draw(GameResult::ThreefoldRepetition)
            }
        }
    }

    /// Whether a king was taken.
    #[must_use]
    pub const fn is_king_captured(&self) -> bool {
        matches!(self, Self::KingCaptured(_))
    }

    /// Whether the side to move was left without moves.
    #[must_use]
    pub const fn is_stalemate(&self) -> bool {
        matches!(self, Self::Stalemate)
    }

    /// Whether a draw rule ended the game.
    #[must_use]
    pub const fn is_draw(&self) -> bool {
        matches!(self, Self::Draw(_))
    }

    /// The winning color, set only for king captures.
    #[must_use]
    pub const fn winner(&self) -> Option<Color> {
        match self {
            Self::KingCaptured(color) => Some(*color),
            _ => None,
        }
    }
}

/// Evaluate the position right after `mover` moved.
///
/// `repetitions` is how many times the resulting position has now occurred
/// in the game, this occurrence included.
#[must_use]
pub fn detect(board: &BoardState, mover: Color, repetitions: u32) -> Option<Outcome> {
    let opponent = mover.opposite();
    if !board.has_king(opponent) {
        return Some(Outcome::KingCaptured(mover));
    }
    if pseudo_legal_moves(board, opponent).is_empty() {
        return Some(Outcome::Stalemate);
    }
    draw_rule(board, repetitions).map(Outcome::Draw)
}

fn draw_rule(board: &BoardState, repetitions: u32) -> Option<DrawRule> {
    if is_insufficient_material(board) {
        Some(DrawRule::InsufficientMaterial)
    } else if board.halfmove_clock() >= FIFTY_MOVE_HALFMOVES {
        Some(DrawRule::FiftyMoveRule)
    } else if repetitions >= REPETITION_LIMIT {
        Some(DrawRule::ThreefoldRepetition)
    } else {
        None
    }
}

/// King against king, king and one minor piece against king, or kings with
/// bishops that all stand on one square color.
#[must_use]
pub fn is_insufficient_material(board: &BoardState) -> bool {
    let mut minors = 0;
    let mut bishop_shades = [false; 2];
    let mut knights = 0;

    for color in Color::ALL {
        for (square, piece) in board.pieces(color) {
            let kind = piece.piece_type;
            if kind == PieceType::King {
                continue;
            }
            if !kind.is_minor() {
                return false;
            }
            minors += 1;
            if kind == PieceType::Knight {
                knights += 1;
            } else {
                bishop_shades[usize::from(square.is_light())] = true;
            }
        }
    }

    if minors <= 1 {
        return true;
    }
    knights == 0 && !(bishop_shades[0] && bishop_shades[1])
}
