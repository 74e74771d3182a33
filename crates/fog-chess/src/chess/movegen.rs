//! Pseudo-legal move generation.
//!
//! Moves obey piece geometry only. Nothing here asks whether the mover's own
//! king is attacked before, during or after the move: in this variant a king
//! is a piece that can be taken, and walking into attack is the player's
//! problem. Castling therefore only needs the right, the pieces in place and
//! an empty path.

use shakmaty::attacks;

use super::board::{square, BoardState, CastlingSide};
use crate::types::chess::{Color, Move, PieceType, Square};

/// Every move physically available to `color`.
///
/// The en-passant target only counts when `color` is the side to move, since
/// it expires after that side's next move.
#[must_use]
pub fn pseudo_legal_moves(board: &BoardState, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    let own = board.occupied_by(color);
    let occupied = board.occupied();

    for (from, piece) in board.pieces(color) {
        let origin: shakmaty::Square = from.into();
        let targets = match piece.piece_type {
            PieceType::Pawn => {
                pawn_moves(board, color, from, &mut moves);
                continue;
            }
            PieceType::Knight => attacks::knight_attacks(origin),
            PieceType::Bishop => attacks::bishop_attacks(origin, occupied),
            PieceType::Rook => attacks::rook_attacks(origin, occupied),
            PieceType::Queen => attacks::queen_attacks(origin, occupied),
            PieceType::King => {
                castling_moves(board, color, from, &mut moves);
                attacks::king_attacks(origin)
            }
        };
        moves.extend(
            (targets & !own)
                .into_iter()
                .map(|to| Move::new(from, Square::from(to))),
        );
    }

    moves
}

/// Whether `mv` is available to the side to move.
#[must_use]
pub fn is_pseudo_legal(board: &BoardState, mv: Move) -> bool {
    pseudo_legal_moves(board, board.side_to_move()).contains(&mv)
}

/// Squares the pawns of `color` attack diagonally, occupied or not.
#[must_use]
pub fn pawn_attack_squares(board: &BoardState, color: Color) -> Vec<Square> {
    board
        .pieces(color)
        .filter(|(_, piece)| piece.piece_type == PieceType::Pawn)
        .flat_map(|(from, _)| attacks::pawn_attacks(color.into(), from.into()).into_iter())
        .map(Square::from)
        .collect()
}

fn pawn_moves(board: &BoardState, color: Color, from: Square, moves: &mut Vec<Move>) {
    let forward = color.forward();

    if let Some(one) = from.offset(0, forward) {
        if board.piece_at(one).is_none() {
            moves.push(Move::new(from, one));
            if from.rank() == color.pawn_rank() {
                if let Some(two) = one.offset(0, forward) {
                    if board.piece_at(two).is_none() {
                        moves.push(Move::new(from, two));
                    }
                }
            }
        }
    }

    let ep_target = board
        .en_passant_target()
        .filter(|_| board.side_to_move() == color);
    for target in attacks::pawn_attacks(color.into(), from.into()) {
        let target = Square::from(target);
        let captures_enemy = board
            .piece_at(target)
            .is_some_and(|p| p.color != color);
        if captures_enemy || ep_target == Some(target) {
            moves.push(Move::new(from, target));
        }
    }
}

fn castling_moves(board: &BoardState, color: Color, from: Square, moves: &mut Vec<Move>) {
    let home_rank = color.home_rank();
    if from != square(4, home_rank) {
        return;
    }

    let rights = board.castling_rights();
    for side in CastlingSide::ALL {
        if !rights.has(color, side) {
            continue;
        }
        let rook_home = side.rook_home(color);
        let rook_in_place = board
            .piece_at(rook_home)
            .is_some_and(|p| p.color == color && p.piece_type == PieceType::Rook);
        if !rook_in_place {
            continue;
        }

        let (lo, hi) = if side.rook_file() < 4 {
            (side.rook_file() + 1, 4)
        } else {
            (5, side.rook_file())
        };
        let path_clear = (lo..hi).all(|file| board.piece_at(square(file, home_rank)).is_none());
        if path_clear {
            moves.push(Move::new(from, square(side.king_target_file(), home_rank)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chess::Piece;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn moves_from(board: &BoardState, color: Color, from: &str) -> Vec<String> {
        let mut targets: Vec<String> = pseudo_legal_moves(board, color)
            .into_iter()
            .filter(|m| m.from == sq(from))
            .map(|m| m.to.to_string())
            .collect();
        targets.sort();
        targets
    }

    #[test]
    fn test_starting_position_has_twenty_moves() {
        let board = BoardState::new();
        assert_eq!(pseudo_legal_moves(&board, Color::White).len(), 20);
        assert_eq!(pseudo_legal_moves(&board, Color::Black).len(), 20);
    }

    #[test]
    fn test_pawn_pushes_and_double_push_blocking() {
        let board = BoardState::from_fen("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1").unwrap();
        assert!(moves_from(&board, Color::White, "e2").is_empty());

        let board = BoardState::from_fen("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1").unwrap();
        assert_eq!(moves_from(&board, Color::White, "e2"), vec!["e3"]);

        let board = BoardState::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert_eq!(moves_from(&board, Color::White, "e2"), vec!["e3", "e4"]);
    }

    #[test]
    fn test_pawn_captures_only_enemies() {
        let board = BoardState::from_fen("4k3/8/8/3p1N2/4P3/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(moves_from(&board, Color::White, "e4"), vec!["d5", "e5"]);
    }

    #[test]
    fn test_black_pawn_moves_down() {
        let board = BoardState::new();
        assert_eq!(moves_from(&board, Color::Black, "d7"), vec!["d5", "d6"]);
    }

    #[test]
    fn test_en_passant_target_is_capturable() {
        let fen = "rnbqkbnr/pppp1ppp/8/4pP2/8/8/PPPPP1PP/RNBQKBNR w KQkq e6 0 3";
        let board = BoardState::from_fen(fen).unwrap();
        assert!(is_pseudo_legal(&board, mv("f5", "e6")));
        assert_eq!(moves_from(&board, Color::White, "f5"), vec!["e6", "f6"]);
    }

    #[test]
    fn test_en_passant_target_ignored_for_other_color() {
        let fen = "4k3/8/8/8/3pP3/8/8/4K3 w - e3 0 1";
        let board = BoardState::from_fen(fen).unwrap();
        assert_eq!(moves_from(&board, Color::Black, "d4"), vec!["d3"]);
    }

    #[test]
    fn test_knight_in_corner() {
        let board = BoardState::from_fen("4k3/8/8/8/8/8/2P5/N3K3 w - - 0 1").unwrap();
        assert_eq!(moves_from(&board, Color::White, "a1"), vec!["b3"]);
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let board = BoardState::from_fen("4k3/8/8/8/1p6/8/8/R2PK3 w - - 0 1").unwrap();
        assert_eq!(
            moves_from(&board, Color::White, "a1"),
            vec!["a2", "a3", "a4", "a5", "a6", "a7", "a8", "b1", "c1"]
        );

        let board = BoardState::from_fen("4k3/8/8/8/1p6/8/8/B3K3 w - - 0 1").unwrap();
        assert_eq!(
            moves_from(&board, Color::White, "a1"),
            vec!["b2", "c3", "d4", "e5", "f6", "g7", "h8"]
        );
    }

    #[test]
    fn test_queen_combines_rook_and_bishop() {
        let board = BoardState::from_fen("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(moves_from(&board, Color::White, "d4").len(), 27);
    }

    #[test]
    fn test_king_may_step_into_attack() {
        // e2 is covered by the black rook; the move is still generated.
        let board = BoardState::from_fen("4r1k1/8/8/8/8/8/8/3K4 w - - 0 1").unwrap();
        assert!(is_pseudo_legal(&board, mv("d1", "e2")));
        assert!(is_pseudo_legal(&board, mv("d1", "e1")));
    }

    #[test]
    fn test_pinned_piece_still_moves() {
        let board = BoardState::from_fen("4r1k1/8/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(is_pseudo_legal(&board, mv("e2", "a6")));
    }

    #[test]
    fn test_castling_through_attacked_squares() {
        // Black rooks cover e1, f1 and d1; both castles are still available.
        let fen = "3rkr2/8/8/8/8/8/8/R3K2R w KQ - 0 1";
        let board = BoardState::from_fen(fen).unwrap();
        assert!(is_pseudo_legal(&board, mv("e1", "g1")));
        assert!(is_pseudo_legal(&board, mv("e1", "c1")));
    }

    #[test]
    fn test_castling_needs_empty_path_and_rights() {
        let board = BoardState::from_fen("4k3/8/8/8/8/8/8/RN2K1NR w KQ - 0 1").unwrap();
        assert!(!is_pseudo_legal(&board, mv("e1", "g1")));
        assert!(!is_pseudo_legal(&board, mv("e1", "c1")));

        let board = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert!(!is_pseudo_legal(&board, mv("e1", "g1")));
        assert!(!is_pseudo_legal(&board, mv("e1", "c1")));
    }

    #[test]
    fn test_castling_requires_rook_on_corner() {
        let mut board = BoardState::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        board.remove_piece(sq("h1"));
        board.set_piece(sq("h1"), Piece::new(Color::White, PieceType::Knight));
        assert!(!is_pseudo_legal(&board, mv("e1", "g1")));
        assert!(is_pseudo_legal(&board, mv("e1", "c1")));
    }

    #[test]
    fn test_black_castling() {
        let board = BoardState::from_fen("r3k2r/8/8/8/8/8/8/4K3 b kq - 0 1").unwrap();
        assert!(is_pseudo_legal(&board, mv("e8", "g8")));
        assert!(is_pseudo_legal(&board, mv("e8", "c8")));
    }

    #[test]
    fn test_moves_onto_enemy_king_are_generated() {
        let board = BoardState::from_fen("4k3/8/8/8/8/8/8/4RK2 w - - 0 1").unwrap();
        assert!(is_pseudo_legal(&board, mv("e1", "e8")));
    }

    #[test]
    fn test_is_pseudo_legal_uses_side_to_move() {
        let board = BoardState::new();
        assert!(is_pseudo_legal(&board, mv("e2", "e4")));
        assert!(!is_pseudo_legal(&board, mv("e7", "e5")));
        assert!(!is_pseudo_legal(&board, mv("e2", "e5")));
    }

    #[test]
    fn test_pawn_attack_squares() {
        let board = BoardState::from_fen("4k3/8/8/8/8/8/P3P3/4K3 w - - 0 1").unwrap();
        let mut squares: Vec<String> = pawn_attack_squares(&board, Color::White)
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        squares.sort();
        assert_eq!(squares, vec!["b3", "d3", "f3"]);
    }
}
