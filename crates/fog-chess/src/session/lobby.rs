//! The lobby turns player events into outbound messages.
//!
//! It owns the matchmaking queue and every live session. Each call handles
//! one event to completion and returns a [`Dispatch`] describing who gets
//! told what. Delivery and timers are the caller's business.

use std::collections::HashMap;

use chrono::Utc;

use crate::error::GameError;
use crate::fog::{LineOfSight, Visibility};
use crate::protocol::{GameOverReason, MoveSummary, ServerMessage};
use crate::session::game::{GameSession, MoveReport};
use crate::session::matchmaking::{FindGameResponse, MatchmakingQueue};
use crate::types::chess::{Color, MoveRequest};
use crate::types::game::{GameEnd, GameId};
use crate::types::player::PlayerId;

/// Outcome of one lobby event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// Messages to deliver, in order.
    pub messages: Vec<(PlayerId, ServerMessage)>,
    /// A game that just ended on the board and should be expired after the
    /// grace window.
    pub expire: Option<GameId>,
}

impl Dispatch {
    fn reply(player: PlayerId, message: ServerMessage) -> Self {
        Self {
            messages: vec![(player, message)],
            expire: None,
        }
    }

    /// True when nothing needs to happen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.expire.is_none()
    }

    /// Messages addressed to `player`.
    pub fn messages_for(&self, player: PlayerId) -> impl Iterator<Item = &ServerMessage> {
        self.messages
            .iter()
            .filter(move |(to, _)| *to == player)
            .map(|(_, message)| message)
    }
}

/// Queue, sessions and fog rule.
pub struct Lobby<V = LineOfSight> {
    queue: MatchmakingQueue,
    games: HashMap<GameId, GameSession>,
    visibility: V,
}

impl Default for Lobby<LineOfSight> {
    fn default() -> Self {
        Self::new(LineOfSight)
    }
}

impl<V: Visibility> Lobby<V> {
    /// An empty lobby using `visibility` for every view.
    pub fn new(visibility: V) -> Self {
        Self {
            queue: MatchmakingQueue::new(),
            games: HashMap::new(),
            visibility,
        }
    }

    /// Live sessions, finished ones in their grace window included.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Whether `player` is waiting for an opponent.
    #[must_use]
    pub fn is_waiting(&self, player: PlayerId) -> bool {
        self.queue.is_waiting(player)
    }

    /// Total pairings made.
    #[must_use]
    pub const fn matches_made(&self) -> u64 {
        self.queue.matches_made()
    }

    /// The session with `game_id`, if it is still around.
    #[must_use]
    pub fn session(&self, game_id: GameId) -> Option<&GameSession> {
        self.games.get(&game_id)
    }

    /// Handle `find_game`.
    pub fn find_game(&mut self, player: PlayerId) -> Dispatch {
        match self.queue.find_game(player) {
            FindGameResponse::Waiting => Dispatch::reply(player, ServerMessage::Waiting),
            FindGameResponse::Cancelled => {
                tracing::debug!(player = %player, "search cancelled");
                Dispatch::reply(player, ServerMessage::SearchCancelled)
            }
            FindGameResponse::Paired { white, black } => {
                let session = GameSession::new(GameId::new(), white, black);
                let game_id = session.id();
                tracing::info!(
                    game_id = %game_id,
                    white = %white,
                    black = %black,
                    "game started"
                );

                let messages = Color::ALL
                    .into_iter()
                    .map(|color| (session.player(color), self.game_start(&session, color)))
                    .collect();
                self.games.insert(game_id, session);
                Dispatch {
                    messages,
                    expire: None,
                }
            }
        }
    }

    /// Handle `make_move`.
    pub fn make_move(
        &mut self,
        player: PlayerId,
        game_id: GameId,
        request: MoveRequest,
    ) -> Dispatch {
        let Some(session) = self.games.get_mut(&game_id) else {
            return reject(player, game_id, &GameError::UnknownSession { game_id });
        };
        let report = match session.make_move(player, request) {
            Ok(report) => report,
            Err(err) => return reject(player, game_id, &err),
        };

        let session = &*session;
        let messages = Color::ALL
            .into_iter()
            .map(|color| {
                let message = move_made(&self.visibility, session, &report, color);
                (session.player(color), message)
            })
            .collect();
        let expire = report.game_end().map(|end| {
            let lasted = Utc::now() - session.created_at();
            tracing::info!(
                game_id = %game_id,
                status = %end.status,
                reason = %end.reason,
                moves = session.moves_played(),
                duration_secs = lasted.num_seconds(),
                "game finished"
            );
            game_id
        });
        Dispatch { messages, expire }
    }

    /// Handle `resign`. The session is removed at once.
    pub fn resign(&mut self, player: PlayerId, game_id: GameId) -> Dispatch {
        let Some(session) = self.games.get_mut(&game_id) else {
            return reject(player, game_id, &GameError::UnknownSession { game_id });
        };
        let Some(end) = session.resign(player) else {
            return Dispatch::default();
        };

        tracing::info!(game_id = %game_id, player = %player, "player resigned");
        let messages = session
            .players()
            .into_iter()
            .filter_map(|to| game_over(end).map(|message| (to, message)))
            .collect();
        self.games.remove(&game_id);
        Dispatch {
            messages,
            expire: None,
        }
    }

    /// Handle a dropped connection.
    ///
    /// Frees the waiting slot and forfeits every running game the player sits
    /// in. Finished games are left to expire on their own.
    pub fn disconnect(&mut self, player: PlayerId) -> Dispatch {
        if self.queue.remove(player) {
            tracing::debug!(player = %player, "waiting player left");
        }

        let mut dispatch = Dispatch::default();
        let mut forfeited = Vec::new();
        for (&game_id, session) in &mut self.games {
            if let Some(end) = session.disconnect(player) {
                tracing::info!(
                    game_id = %game_id,
                    player = %player,
                    "player disconnected mid-game"
                );
                let remaining = session.players().into_iter().filter(|&p| p != player);
                for to in remaining {
                    if let Some(message) = game_over(end) {
                        dispatch.messages.push((to, message));
                    }
                }
                forfeited.push(game_id);
            }
        }
        for game_id in forfeited {
            self.games.remove(&game_id);
        }
        dispatch
    }

    /// Drop a finished game after its grace window. Returns whether it was
    /// still present.
    pub fn expire(&mut self, game_id: GameId) -> bool {
        let removed = self.games.remove(&game_id).is_some();
        if removed {
            tracing::debug!(game_id = %game_id, "finished game discarded");
        }
        removed
    }

    fn game_start(&self, session: &GameSession, color: Color) -> ServerMessage {
        let board = session.board();
        ServerMessage::GameStart {
            game_id: session.id(),
            color,
            board: self.visibility.filter_board(board, color),
            visible_squares: self.visibility.visible_squares(board, color),
            turn: board.side_to_move(),
        }
    }
}

fn move_made<V: Visibility>(
    visibility: &V,
    session: &GameSession,
    report: &MoveReport,
    viewer: Color,
) -> ServerMessage {
    let board = session.board();
    let outcome = report.outcome;
    ServerMessage::MoveMade {
        played: MoveSummary {
            from: report.request.from,
            to: report.request.to,
            promotion: report.details.promotion,
            captured: report.details.captured,
        },
        turn: report.turn,
        is_game_over: report.is_game_over(),
        is_checkmate: outcome.is_some_and(|o| o.is_king_captured()),
        is_stalemate: outcome.is_some_and(|o| o.is_stalemate()),
        is_draw: outcome.is_some_and(|o| o.is_draw()),
        winner: outcome.and_then(|o| o.winner()),
        board: visibility.filter_board(board, viewer),
        visible_squares: visibility.visible_squares(board, viewer),
    }
}

/// Answer a refused request: silent errors are dropped, the rest go back to
/// the requester alone.
fn reject(player: PlayerId, game_id: GameId, err: &GameError) -> Dispatch {
    if err.is_silent() {
        tracing::debug!(game_id = %game_id, player = %player, error = %err, "request ignored");
        return Dispatch::default();
    }
    tracing::debug!(game_id = %game_id, player = %player, error = %err, "request rejected");
    Dispatch::reply(player, ServerMessage::error(err.player_message()))
}

fn game_over(end: GameEnd) -> Option<ServerMessage> {
    Some(ServerMessage::GameOver {
        reason: GameOverReason::from_result(end.reason)?,
        winner: end.winner()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::chess::Square;

    fn req(from: &str, to: &str) -> MoveRequest {
        MoveRequest::new(
            from.parse::<Square>().unwrap(),
            to.parse::<Square>().unwrap(),
        )
    }

    fn paired(lobby: &mut Lobby) -> (PlayerId, PlayerId, GameId) {
        let white = PlayerId::new();
        let black = PlayerId::new();
        lobby.find_game(white);
        let dispatch = lobby.find_game(black);
        let game_id = match &dispatch.messages[0].1 {
            ServerMessage::GameStart { game_id, .. } => *game_id,
            other => panic!("expected game_start, got {other:?}"),
        };
        (white, black, game_id)
    }

    #[test]
    fn test_waiting_then_paired() {
        let mut lobby: Lobby = Lobby::default();
        let white = PlayerId::new();
        let black = PlayerId::new();

        let dispatch = lobby.find_game(white);
        assert_eq!(dispatch.messages, vec![(white, ServerMessage::Waiting)]);
        assert!(lobby.is_waiting(white));

        let dispatch = lobby.find_game(black);
        assert_eq!(dispatch.messages.len(), 2);
        assert_eq!(lobby.game_count(), 1);
        assert!(!lobby.is_waiting(white));

        for (player, expected) in [(white, Color::White), (black, Color::Black)] {
            let start = dispatch.messages_for(player).next().unwrap();
            match start {
                ServerMessage::GameStart {
                    color,
                    turn,
                    visible_squares,
                    ..
                } => {
                    assert_eq!(*color, expected);
                    assert_eq!(*turn, Color::White);
                    assert_eq!(visible_squares.len(), 32);
                }
                other => panic!("expected game_start, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_repeat_find_game_cancels() {
        let mut lobby: Lobby = Lobby::default();
        let player = PlayerId::new();
        lobby.find_game(player);
        let dispatch = lobby.find_game(player);
        assert_eq!(
            dispatch.messages,
            vec![(player, ServerMessage::SearchCancelled)]
        );
        assert_eq!(lobby.game_count(), 0);
        assert!(!lobby.is_waiting(player));
    }

    #[test]
    fn test_errors_go_to_requester_only() {
        let mut lobby: Lobby = Lobby::default();
        let (_, black, game_id) = paired(&mut lobby);
        let dispatch = lobby.make_move(black, game_id, req("e7", "e5"));
        assert_eq!(
            dispatch.messages,
            vec![(black, ServerMessage::error("Not your turn"))]
        );
        assert!(dispatch.expire.is_none());
    }

    #[test]
    fn test_unknown_game_is_silent() {
        let mut lobby: Lobby = Lobby::default();
        let (white, _, _) = paired(&mut lobby);
        assert!(lobby.make_move(white, GameId::new(), req("e2", "e4")).is_empty());
        assert!(lobby.resign(white, GameId::new()).is_empty());
    }

    #[test]
    fn test_stranger_is_told_it_is_not_their_turn() {
        let mut lobby: Lobby = Lobby::default();
        let (white, black, game_id) = paired(&mut lobby);
        let stranger = PlayerId::new();
        let dispatch = lobby.make_move(stranger, game_id, req("e2", "e4"));
        assert_eq!(
            dispatch.messages,
            vec![(stranger, ServerMessage::error("Not your turn"))]
        );
        assert_eq!(dispatch.messages_for(white).count(), 0);
        assert_eq!(dispatch.messages_for(black).count(), 0);
        assert_eq!(lobby.session(game_id).unwrap().moves_played(), 0);
    }

    #[test]
    fn test_resign_removes_game() {
        let mut lobby: Lobby = Lobby::default();
        let (white, black, game_id) = paired(&mut lobby);
        let dispatch = lobby.resign(black, game_id);
        let expected = ServerMessage::GameOver {
            reason: GameOverReason::Resign,
            winner: Color::White,
        };
        assert_eq!(
            dispatch.messages,
            vec![(white, expected.clone()), (black, expected)]
        );
        assert_eq!(lobby.game_count(), 0);
    }

    #[test]
    fn test_disconnect_notifies_remaining_player() {
        let mut lobby: Lobby = Lobby::default();
        let (white, black, game_id) = paired(&mut lobby);
        let dispatch = lobby.disconnect(white);
        assert_eq!(
            dispatch.messages,
            vec![(
                black,
                ServerMessage::GameOver {
                    reason: GameOverReason::Disconnect,
                    winner: Color::Black,
                }
            )]
        );
        assert!(lobby.session(game_id).is_none());
    }

    #[test]
    fn test_disconnect_while_waiting_frees_slot() {
        let mut lobby: Lobby = Lobby::default();
        let player = PlayerId::new();
        lobby.find_game(player);
        assert!(lobby.disconnect(player).is_empty());
        assert!(!lobby.is_waiting(player));
    }

    #[test]
    fn test_expire() {
        let mut lobby: Lobby = Lobby::default();
        let (_, _, game_id) = paired(&mut lobby);
        assert!(lobby.expire(game_id));
        assert!(!lobby.expire(game_id));
    }
}
