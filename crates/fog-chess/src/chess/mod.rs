//! Rules engine for king-capture chess.
//!
//! This module builds on shakmaty's board storage and attack tables for:
//! - Board state and FEN handling
//! - Pseudo-legal move generation (no check rule)
//! - Move application
//! - Terminal detection (king capture, stalemate, draw rules)

pub mod apply;
pub mod board;
pub mod movegen;
pub mod outcome;

pub use apply::{apply_move, AppliedMove, MoveDetails};
pub use board::{BoardState, CastlingRights, CastlingSide, STARTING_FEN};
pub use movegen::{is_pseudo_legal, pawn_attack_squares, pseudo_legal_moves};
pub use outcome::{detect, is_insufficient_material, DrawRule, Outcome};
