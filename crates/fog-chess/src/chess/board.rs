//! Mutable board state for the king-capture variant.
//!
//! Piece placement lives in a shakmaty [`Board`], which (unlike shakmaty's
//! `Chess` position) accepts a side with no king. Everything else a FEN record
//! carries is tracked alongside it.

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::{Bitboard, Board};

use crate::error::ChessError;
use crate::types::chess::{Color, Piece, PieceType, Square};

/// Standard starting FEN.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// One of the two castling directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastlingSide {
    /// Short castling, towards the h-file.
    KingSide,
    /// Long castling, towards the a-file.
    QueenSide,
}

impl CastlingSide {
    /// Both sides, king side first.
    pub const ALL: [Self; 2] = [Self::KingSide, Self::QueenSide];

    /// File of the rook that castles on this side.
    #[must_use]
    pub const fn rook_file(self) -> u8 {
        match self {
            Self::KingSide => 7,
            Self::QueenSide => 0,
        }
    }

    /// File the king lands on.
    #[must_use]
    pub const fn king_target_file(self) -> u8 {
        match self {
            Self::KingSide => 6,
            Self::QueenSide => 2,
        }
    }

    /// File the rook lands on.
    #[must_use]
    pub const fn rook_target_file(self) -> u8 {
        match self {
            Self::KingSide => 5,
            Self::QueenSide => 3,
        }
    }

    /// The side a king landing on `file` castled towards.
    #[must_use]
    pub const fn from_king_target(file: u8) -> Option<Self> {
        match file {
            6 => Some(Self::KingSide),
            2 => Some(Self::QueenSide),
            _ => None,
        }
    }

    /// Home corner of the rook for `color` on this side.
    #[must_use]
    pub fn rook_home(self, color: Color) -> Square {
        square(self.rook_file(), color.home_rank())
    }
}

/// The four castling flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CastlingRights {
    white_king_side: bool,
    white_queen_side: bool,
    black_king_side: bool,
    black_queen_side: bool,
}

impl CastlingRights {
    /// All four rights, as in the starting position.
    pub const ALL: Self = Self {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    /// No rights at all.
    pub const NONE: Self = Self {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    fn flag_mut(&mut self, color: Color, side: CastlingSide) -> &mut bool {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => &mut self.white_king_side,
            (Color::White, CastlingSide::QueenSide) => &mut self.white_queen_side,
            (Color::Black, CastlingSide::KingSide) => &mut self.black_king_side,
            (Color::Black, CastlingSide::QueenSide) => &mut self.black_queen_side,
        }
    }

    /// Whether `color` may still castle towards `side`.
    #[must_use]
    pub const fn has(&self, color: Color, side: CastlingSide) -> bool {
        match (color, side) {
            (Color::White, CastlingSide::KingSide) => self.white_king_side,
            (Color::White, CastlingSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastlingSide::KingSide) => self.black_king_side,
            (Color::Black, CastlingSide::QueenSide) => self.black_queen_side,
        }
    }

    /// Grant a right.
    pub fn grant(&mut self, color: Color, side: CastlingSide) {
        *self.flag_mut(color, side) = true;
    }

    /// Revoke a single right.
    pub fn revoke(&mut self, color: Color, side: CastlingSide) {
        *self.flag_mut(color, side) = false;
    }

    /// Revoke both rights of `color`.
    pub fn revoke_all(&mut self, color: Color) {
        for side in CastlingSide::ALL {
            self.revoke(color, side);
        }
    }

    /// True if no rights remain.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.white_king_side
            || self.white_queen_side
            || self.black_king_side
            || self.black_queen_side)
    }

    /// FEN castling field, `-` when empty.
    #[must_use]
    pub fn to_fen_field(&self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut field = String::with_capacity(4);
        for (flag, c) in [
            (self.white_king_side, 'K'),
            (self.white_queen_side, 'Q'),
            (self.black_king_side, 'k'),
            (self.black_queen_side, 'q'),
        ] {
            if flag {
                field.push(c);
            }
        }
        field
    }
}

/// A complete chess position: placement, side to move, castling rights,
/// en-passant target and move counters.
///
/// At most one king per color is ever present; zero is allowed and means that
/// king has been captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    placement: Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl BoardState {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        Self {
            placement: Board::new(),
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// An empty board with `side_to_move` to play and no castling rights.
    #[must_use]
    pub fn empty(side_to_move: Color) -> Self {
        Self {
            placement: Board::empty(),
            side_to_move,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parse a FEN record. Positions without a king are accepted.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| ChessError::InvalidFen(format!("{e}")))?;
        let setup = fen.into_setup();

        let kings_ok = Color::ALL.iter().all(|&color| {
            let kings = setup.board.by_piece(shakmaty::Piece {
                color: color.into(),
                role: shakmaty::Role::King,
            });
            kings.count() <= 1
        });
        if !kings_ok {
            return Err(ChessError::InvalidFen(
                "more than one king of a color".to_string(),
            ));
        }

        let mut castling = CastlingRights::NONE;
        for color in Color::ALL {
            for side in CastlingSide::ALL {
                if setup
                    .castling_rights
                    .contains(side.rook_home(color).into())
                {
                    castling.grant(color, side);
                }
            }
        }

        Ok(Self {
            placement: setup.board,
            side_to_move: setup.turn.into(),
            castling,
            en_passant: setup.ep_square.map(Square::from),
            halfmove_clock: setup.halfmoves,
            fullmove_number: setup.fullmoves.get(),
        })
    }

    /// Serialize as a FEN record.
    #[must_use]
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} {}",
            self.position_key(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// The first four FEN fields: everything that identifies a position for
    /// repetition purposes.
    #[must_use]
    pub fn position_key(&self) -> String {
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {}",
            self.placement_fen(),
            if self.side_to_move.is_white() { 'w' } else { 'b' },
            self.castling.to_fen_field(),
            ep
        )
    }

    fn placement_fen(&self) -> String {
        let mut out = String::with_capacity(64);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(square(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(shakmaty::Piece::from(piece).char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// The piece on `sq`, if any.
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.placement.piece_at(sq.into()).map(Piece::from)
    }

    /// Put `piece` on `sq`, replacing whatever was there.
    pub fn set_piece(&mut self, sq: Square, piece: Piece) {
        self.placement.set_piece_at(sq.into(), piece.into());
    }

    /// Clear `sq` and return what was on it.
    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.placement.remove_piece_at(sq.into()).map(Piece::from)
    }

    /// All pieces of `color` with their squares.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.placement
            .by_color(color.into())
            .into_iter()
            .filter_map(move |sq| {
                self.placement
                    .piece_at(sq)
                    .map(|p| (Square::from(sq), Piece::from(p)))
            })
    }

    /// Squares occupied by any piece.
    #[must_use]
    pub fn occupied(&self) -> Bitboard {
        self.placement.occupied()
    }

    /// Squares occupied by `color`.
    #[must_use]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.placement.by_color(color.into())
    }

    /// Number of pieces on the board.
    #[must_use]
    pub fn piece_count(&self) -> usize {
        self.placement.occupied().count()
    }

    /// The square of `color`'s king, `None` once it has been captured.
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.placement.king_of(color.into()).map(Square::from)
    }

    /// Whether `color` still has a king.
    #[must_use]
    pub fn has_king(&self, color: Color) -> bool {
        self.king_square(color).is_some()
    }

    /// Color to move.
    #[must_use]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Set the color to move.
    pub fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    /// Current castling rights.
    #[must_use]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    /// Mutable castling rights.
    pub fn castling_rights_mut(&mut self) -> &mut CastlingRights {
        &mut self.castling
    }

    /// Square skipped by the last double pawn push, if that was the last move.
    #[must_use]
    pub const fn en_passant_target(&self) -> Option<Square> {
        self.en_passant
    }

    /// Set or clear the en-passant target.
    pub fn set_en_passant_target(&mut self, target: Option<Square>) {
        self.en_passant = target;
    }

    /// Half-moves since the last pawn move or capture.
    #[must_use]
    pub const fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Set the halfmove clock.
    pub fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }

    /// Full move number, starting at 1 and incremented after black moves.
    #[must_use]
    pub const fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Set the fullmove number.
    pub fn set_fullmove_number(&mut self, number: u32) {
        self.fullmove_number = number;
    }

    /// Count of `color`'s pieces of type `piece_type`.
    #[must_use]
    pub fn count(&self, color: Color, piece_type: PieceType) -> usize {
        self.placement
            .by_piece(Piece::new(color, piece_type).into())
            .count()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BoardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_fen())
    }
}

/// Build a square from in-range coordinates.
///
/// Callers pass constants or values read back from another square.
pub(crate) fn square(file: u8, rank: u8) -> Square {
    Square::new(file & 7, rank & 7).unwrap_or_else(|| unreachable!("masked to 0-7"))
}
