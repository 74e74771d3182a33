//! Fog of war: what each player is allowed to see.
//!
//! The session layer treats visibility as a pluggable rule. [`LineOfSight`]
//! is the rule the server ships with.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::chess::board::{square, BoardState};
use crate::chess::movegen::{pawn_attack_squares, pseudo_legal_moves};
use crate::types::chess::{Color, Piece, PieceType, Square};

/// A fog rule. Implementations must be pure functions of the board.
pub trait Visibility: Send + 'static {
    /// Squares `color` can currently see.
    fn visible_squares(&self, board: &BoardState, color: Color) -> BTreeSet<Square>;

    /// The board as `color` sees it.
    ///
    /// Own pieces are always shown. Opponent pieces only on visible squares.
    fn filter_board(&self, board: &BoardState, color: Color) -> FilteredBoard {
        let visible = self.visible_squares(board, color);
        FilteredBoard::project(board, color, &visible)
    }
}

/// A color sees the squares it occupies, every square it could move to, and
/// the diagonals its pawns attack.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineOfSight;

impl Visibility for LineOfSight {
    fn visible_squares(&self, board: &BoardState, color: Color) -> BTreeSet<Square> {
        let mut visible: BTreeSet<Square> = board.pieces(color).map(|(sq, _)| sq).collect();
        visible.extend(pseudo_legal_moves(board, color).into_iter().map(|m| m.to));
        visible.extend(pawn_attack_squares(board, color));
        visible
    }
}

/// One piece as shown to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisiblePiece {
    pub square: Square,
    #[serde(rename = "type")]
    pub piece_type: PieceType,
    pub color: Color,
}

/// A fogged board: rows from rank 8 down to rank 1, files a to h.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilteredBoard {
    rows: [[Option<VisiblePiece>; 8]; 8],
}

impl FilteredBoard {
    /// Keep own pieces and opponent pieces on `visible` squares.
    #[must_use]
    pub fn project(board: &BoardState, viewer: Color, visible: &BTreeSet<Square>) -> Self {
        let mut rows = [[None; 8]; 8];
        for (row_index, row) in rows.iter_mut().enumerate() {
            let rank = 7 - row_index as u8;
            for (file, cell) in row.iter_mut().enumerate() {
                let sq = square(file as u8, rank);
                *cell = board
                    .piece_at(sq)
                    .filter(|piece| piece.color == viewer || visible.contains(&sq))
                    .map(|piece| VisiblePiece {
                        square: sq,
                        piece_type: piece.piece_type,
                        color: piece.color,
                    });
            }
        }
        Self { rows }
    }

    /// Rows, rank 8 first.
    #[must_use]
    pub const fn rows(&self) -> &[[Option<VisiblePiece>; 8]; 8] {
        &self.rows
    }

    /// What this view shows on `sq`.
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.rows[usize::from(7 - sq.rank())][usize::from(sq.file())]
            .map(|cell| Piece::new(cell.color, cell.piece_type))
    }

    /// Number of pieces shown.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.rows.iter().flatten().flatten().count()
    }
}
