//! Move application.
//!
//! Produces the position after a move without consulting king safety. The
//! input board is never touched: callers swap in the returned state only on
//! success, so a failed application cannot leave a half-moved position behind.

use serde::{Deserialize, Serialize};

use super::board::{square, BoardState, CastlingSide};
use crate::error::ChessError;
use crate::types::chess::{Color, MoveRequest, Piece, PieceType, Square};

/// A successfully applied move.
#[derive(Debug, Clone)]
pub struct AppliedMove {
    /// Position after the move.
    pub board: BoardState,
    /// What happened on the board.
    pub details: MoveDetails,
}

/// Facts about an applied move worth reporting to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDetails {
    /// The piece that moved, as it was before the move.
    pub piece: Piece,
    /// Captured piece, including a pawn taken en passant.
    pub captured: Option<Piece>,
    /// Piece type placed on the destination by promotion.
    pub promotion: Option<PieceType>,
    /// Castling direction, for king moves of two files.
    pub castling: Option<CastlingSide>,
    /// Whether the capture was en passant.
    pub en_passant: bool,
}

/// Apply `request` to `board` for the side to move.
///
/// The request is expected to have passed the pseudo-legal generator. Errors
/// here mean the move is physically impossible on this board.
pub fn apply_move(board: &BoardState, request: &MoveRequest) -> Result<AppliedMove, ChessError> {
    let illegal = |reason: &'static str| ChessError::IllegalMove {
        request: *request,
        reason,
    };

    let mover = board.side_to_move();
    let (from, to) = (request.from, request.to);
    let piece = board
        .piece_at(from)
        .ok_or_else(|| illegal("no piece on source square"))?;
    if piece.color != mover {
        return Err(illegal("piece does not belong to the side to move"));
    }
    if from == to {
        return Err(illegal("source and destination are the same square"));
    }
    if board.piece_at(to).is_some_and(|p| p.color == mover) {
        return Err(illegal("destination holds a friendly piece"));
    }

    let mut next = board.clone();

    // Lift the piece and resolve what lands on the destination.
    next.remove_piece(from);
    let is_pawn = piece.piece_type == PieceType::Pawn;
    let promotion = if is_pawn && to.rank() == mover.promotion_rank() {
        let target = request.promotion.unwrap_or(PieceType::Queen);
        if !target.is_promotion_target() {
            return Err(illegal("pawns promote to knight, bishop, rook or queen"));
        }
        Some(target)
    } else {
        None
    };
    let landing = Piece::new(mover, promotion.unwrap_or(piece.piece_type));
    let mut captured = next.remove_piece(to);
    next.set_piece(to, landing);

    // Castling drags the rook along.
    let is_castle = piece.piece_type == PieceType::King && from.file().abs_diff(to.file()) == 2;
    let castling = if is_castle {
        let side = CastlingSide::from_king_target(to.file())
            .ok_or_else(|| illegal("king jumped to a non-castling file"))?;
        let rook_from = square(side.rook_file(), from.rank());
        let rook_to = square(side.rook_target_file(), from.rank());
        let rook = next
            .remove_piece(rook_from)
            .filter(|p| p.color == mover && p.piece_type == PieceType::Rook)
            .ok_or_else(|| illegal("no rook to castle with"))?;
        next.set_piece(rook_to, rook);
        Some(side)
    } else {
        None
    };

    // En passant removes the pawn behind the target square.
    let en_passant = is_pawn
        && from.file() != to.file()
        && captured.is_none()
        && board.en_passant_target() == Some(to);
    if en_passant {
        let victim_square = square(to.file(), from.rank());
        captured = next.remove_piece(victim_square);
    }

    update_castling_rights(&mut next, mover, piece, from, to);

    let double_push = is_pawn && from.rank().abs_diff(to.rank()) == 2;
    let skipped = double_push.then(|| square(from.file(), (from.rank() + to.rank()) / 2));
    next.set_en_passant_target(skipped);

    next.set_side_to_move(mover.opposite());
    if is_pawn || captured.is_some() {
        next.set_halfmove_clock(0);
    } else {
        next.set_halfmove_clock(board.halfmove_clock() + 1);
    }
    if mover == Color::Black {
        next.set_fullmove_number(board.fullmove_number() + 1);
    }

    Ok(AppliedMove {
        board: next,
        details: MoveDetails {
            piece,
            captured,
            promotion,
            castling,
            en_passant,
        },
    })
}

/// A king move forfeits both of its side's rights. Any move leaving from or
/// landing on a rook's home corner forfeits that corner's right, which covers
/// the rook moving away and the rook being captured at home.
fn update_castling_rights(
    next: &mut BoardState,
    mover: Color,
    piece: Piece,
    from: Square,
    to: Square,
) {
    let rights = next.castling_rights_mut();
    if piece.piece_type == PieceType::King {
        rights.revoke_all(mover);
    }
    for color in Color::ALL {
        for side in CastlingSide::ALL {
            let corner = side.rook_home(color);
            if from == corner || to == corner {
                rights.revoke(color, side);
            }
        }
    }
}
