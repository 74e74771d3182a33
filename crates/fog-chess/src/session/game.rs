//! A single game between two seated players.
//!
//! The session owns its board and is the only thing that mutates it. Every
//! request runs the same pipeline: turn check, generator membership, apply,
//! terminal detection. A rejected request leaves the session untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::chess::apply::{apply_move, MoveDetails};
use crate::chess::board::BoardState;
use crate::chess::movegen::is_pseudo_legal;
use crate::chess::outcome::{detect, Outcome};
use crate::error::GameError;
use crate::types::chess::{Color, MoveRequest};
use crate::types::game::{GameEnd, GameId, GameResult};
use crate::types::player::PlayerId;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the given color to move.
    AwaitingMove(Color),
    /// Finished. Kept around only until the lobby discards it.
    Terminal(GameEnd),
}

/// Result of a move that went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// Color that moved.
    pub mover: Color,
    /// The move as requested.
    pub request: MoveRequest,
    /// What the move did on the board.
    pub details: MoveDetails,
    /// Set when the move ended the game.
    pub outcome: Option<Outcome>,
    /// Side to move next. Still flips on a game-ending move.
    pub turn: Color,
}

impl MoveReport {
    /// Whether the move ended the game.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Final result, if the move ended the game.
    #[must_use]
    pub fn game_end(&self) -> Option<GameEnd> {
        self.outcome.map(Outcome::to_game_end)
    }
}

/// One game in progress or just finished.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    board: BoardState,
    white: PlayerId,
    black: PlayerId,
    phase: Phase,
    repetitions: HashMap<String, u32>,
    moves_played: u32,
    created_at: DateTime<Utc>,
}

impl GameSession {
    /// A fresh game from the starting position.
    #[must_use]
    pub fn new(id: GameId, white: PlayerId, black: PlayerId) -> Self {
        Self::from_board(id, white, black, BoardState::new())
    }

    /// A game starting from an arbitrary position.
    #[must_use]
    pub fn from_board(id: GameId, white: PlayerId, black: PlayerId, board: BoardState) -> Self {
        let mut repetitions = HashMap::new();
        repetitions.insert(board.position_key(), 1);
        Self {
            id,
            phase: Phase::AwaitingMove(board.side_to_move()),
            board,
            white,
            black,
            repetitions,
            moves_played: 0,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> GameId {
        self.id
    }

    #[must_use]
    pub const fn board(&self) -> &BoardState {
        &self.board
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moves applied so far, both colors counted.
    #[must_use]
    pub const fn moves_played(&self) -> u32 {
        self.moves_played
    }

    /// The player seated as `color`.
    #[must_use]
    pub const fn player(&self, color: Color) -> PlayerId {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    /// The color `player` is seated as, if seated at all.
    #[must_use]
    pub fn color_of(&self, player: PlayerId) -> Option<Color> {
        if player == self.white {
            Some(Color::White)
        } else if player == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Whether `player` is seated in this game.
    #[must_use]
    pub fn has_player(&self, player: PlayerId) -> bool {
        self.color_of(player).is_some()
    }

    /// Both players, white first.
    #[must_use]
    pub const fn players(&self) -> [PlayerId; 2] {
        [self.white, self.black]
    }

    /// Color to move, `None` once the game is over.
    #[must_use]
    pub const fn turn(&self) -> Option<Color> {
        match self.phase {
            Phase::AwaitingMove(color) => Some(color),
            Phase::Terminal(_) => None,
        }
    }

    /// Final result, once there is one.
    #[must_use]
    pub const fn result(&self) -> Option<GameEnd> {
        match self.phase {
            Phase::AwaitingMove(_) => None,
            Phase::Terminal(end) => Some(end),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }

    /// Play `request` on behalf of `player`.
    pub fn make_move(
        &mut self,
        player: PlayerId,
        request: MoveRequest,
    ) -> Result<MoveReport, GameError> {
        let side = match self.phase {
            Phase::Terminal(end) => return Err(GameError::GameOver { status: end.status }),
            Phase::AwaitingMove(side) => side,
        };
        let mover = self.color_of(player).ok_or(GameError::NotInGame)?;
        if mover != side {
            return Err(GameError::NotYourTurn { expected: side });
        }
        if !is_pseudo_legal(&self.board, request.as_move()) {
            return Err(GameError::InvalidMove { request });
        }

        let applied = apply_move(&self.board, &request).map_err(|e| {
            tracing::error!(
                game_id = %self.id,
                request = %request,
                error = %e,
                "generated move could not be applied"
            );
            GameError::MoveFailed(e)
        })?;

        self.board = applied.board;
        self.moves_played += 1;
        let seen = self
            .repetitions
            .entry(self.board.position_key())
            .or_insert(0);
        *seen += 1;

        let outcome = detect(&self.board, mover, *seen);
        let turn = self.board.side_to_move();
        self.phase = match outcome {
            Some(outcome) => Phase::Terminal(outcome.to_game_end()),
            None => Phase::AwaitingMove(turn),
        };

        tracing::debug!(game_id = %self.id, mover = %mover, request = %request, "move applied");

        Ok(MoveReport {
            mover,
            request,
            details: applied.details,
            outcome,
            turn,
        })
    }

    /// `player` gives up. The opponent wins.
    ///
    /// Returns `None` if the player is not seated or the game already ended.
    pub fn resign(&mut self, player: PlayerId) -> Option<GameEnd> {
        self.forfeit(player, GameResult::Resignation)
    }

    /// `player` went away. The remaining player wins.
    ///
    /// Returns `None` if the player is not seated or the game already ended.
    pub fn disconnect(&mut self, player: PlayerId) -> Option<GameEnd> {
        self.forfeit(player, GameResult::Disconnect)
    }

    fn forfeit(&mut self, player: PlayerId, reason: GameResult) -> Option<GameEnd> {
        if self.is_terminal() {
            return None;
        }
        let loser = self.color_of(player)?;
        let end = GameEnd::win(loser.opposite(), reason);
        self.phase = Phase::Terminal(end);
        Some(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chess::{PieceType, Square};
    use crate::types::game::GameStatus;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn req(from: &str, to: &str) -> MoveRequest {
        MoveRequest::new(sq(from), sq(to))
    }

    fn seated() -> (GameSession, PlayerId, PlayerId) {
        let white = PlayerId::new();
        let black = PlayerId::new();
        (GameSession::new(GameId::new(), white, black), white, black)
    }

    fn seated_at(fen: &str) -> (GameSession, PlayerId, PlayerId) {
        let white = PlayerId::new();
        let black = PlayerId::new();
        let board = BoardState::from_fen(fen).unwrap();
        (
            GameSession::from_board(GameId::new(), white, black, board),
            white,
            black,
        )
    }

    #[test]
    fn test_new_session() {
        let (game, white, black) = seated();
        assert_eq!(game.phase(), Phase::AwaitingMove(Color::White));
        assert_eq!(game.player(Color::White), white);
        assert_eq!(game.color_of(black), Some(Color::Black));
        assert_eq!(game.color_of(PlayerId::new()), None);
        assert!(!game.is_terminal());
    }

    #[test]
    fn test_moves_alternate() {
        let (mut game, white, black) = seated();
        let report = game.make_move(white, req("e2", "e4")).unwrap();
        assert_eq!(report.mover, Color::White);
        assert_eq!(report.turn, Color::Black);
        assert!(!report.is_game_over());
        assert_eq!(game.turn(), Some(Color::Black));

        game.make_move(black, req("e7", "e5")).unwrap();
        assert_eq!(game.turn(), Some(Color::White));
        assert_eq!(game.moves_played(), 2);
    }

    #[test]
    fn test_wrong_player_is_rejected_without_mutation() {
        let (mut game, _, black) = seated();
        let before = game.board().clone();
        let err = game.make_move(black, req("e7", "e5")).unwrap_err();
        assert_eq!(
            err,
            GameError::NotYourTurn {
                expected: Color::White
            }
        );
        assert_eq!(game.board(), &before);
    }

    #[test]
    fn test_stranger_is_not_in_game() {
        let (mut game, _, _) = seated();
        let err = game.make_move(PlayerId::new(), req("e2", "e4")).unwrap_err();
        assert_eq!(err, GameError::NotInGame);
    }

    #[test]
    fn test_invalid_move_is_rejected() {
        let (mut game, white, _) = seated();
        let err = game.make_move(white, req("e2", "e5")).unwrap_err();
        assert!(matches!(err, GameError::InvalidMove { .. }));
        assert_eq!(game.board(), &BoardState::new());
        assert_eq!(game.turn(), Some(Color::White));
    }

    #[test]
    fn test_bad_promotion_piece_fails_the_move() {
        let (mut game, white, _) = seated_at("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let before = game.board().clone();
        let err = game
            .make_move(white, req("a7", "a8").promote_to(PieceType::King))
            .unwrap_err();
        assert!(matches!(err, GameError::MoveFailed(_)));
        assert_eq!(game.board(), &before);
        assert_eq!(game.turn(), Some(Color::White));
    }

    #[test]
    fn test_capturing_the_king_ends_the_game() {
        let (mut game, white, black) = seated_at("4k3/8/8/8/8/8/8/4RK2 w - - 0 1");
        let report = game.make_move(white, req("e1", "e8")).unwrap();
        assert_eq!(report.outcome, Some(Outcome::KingCaptured(Color::White)));
        assert_eq!(
            report.details.captured.map(|p| p.piece_type),
            Some(PieceType::King)
        );
        let end = game.result().unwrap();
        assert_eq!(end.status, GameStatus::WhiteWins);
        assert_eq!(end.reason, GameResult::KingCaptured);

        let err = game.make_move(black, req("e8", "e7")).unwrap_err();
        assert_eq!(
            err,
            GameError::GameOver {
                status: GameStatus::WhiteWins
            }
        );
    }

    #[test]
    fn test_threefold_repetition() {
        let (mut game, white, black) = seated();
        let shuffle = [
            (white, "g1", "f3"),
            (black, "g8", "f6"),
            (white, "f3", "g1"),
            (black, "f6", "g8"),
            (white, "g1", "f3"),
            (black, "g8", "f6"),
            (white, "f3", "g1"),
        ];
        for (player, from, to) in shuffle {
            let report = game.make_move(player, req(from, to)).unwrap();
            assert!(!report.is_game_over());
        }
        // Starting position for the third time.
        let report = game.make_move(black, req("f6", "g8")).unwrap();
        assert_eq!(
            report.game_end(),
            Some(GameEnd::draw(GameResult::ThreefoldRepetition))
        );
        assert!(game.is_terminal());
    }

    #[test]
    fn test_resign() {
        let (mut game, white, black) = seated();
        assert_eq!(game.resign(PlayerId::new()), None);
        let end = game.resign(white).unwrap();
        assert_eq!(end, GameEnd::win(Color::Black, GameResult::Resignation));
        assert_eq!(game.result(), Some(end));
        assert_eq!(game.resign(black), None);
    }

    #[test]
    fn test_disconnect() {
        let (mut game, _, black) = seated();
        let end = game.disconnect(black).unwrap();
        assert_eq!(end.winner(), Some(Color::White));
        assert_eq!(end.reason, GameResult::Disconnect);
        assert_eq!(game.turn(), None);
    }

    #[test]
    fn test_disconnect_after_game_over_changes_nothing() {
        let (mut game, white, black) = seated_at("4k3/8/8/8/8/8/8/4RK2 w - - 0 1");
        game.make_move(white, req("e1", "e8")).unwrap();
        assert_eq!(game.disconnect(black), None);
        assert_eq!(game.result().unwrap().reason, GameResult::KingCaptured);
    }
}
