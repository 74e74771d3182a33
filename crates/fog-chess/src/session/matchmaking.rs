//! Matchmaking queue with a single waiting slot.
//!
//! The first player to ask waits. The next distinct player is paired with
//! them: the one who waited plays white. Asking again while waiting cancels
//! the search.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::player::PlayerId;

/// The player currently waiting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedPlayer {
    /// Player ID.
    pub player_id: PlayerId,
    /// When the player joined the queue.
    pub queued_at: DateTime<Utc>,
}

impl QueuedPlayer {
    /// Create a new queued player entry.
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            queued_at: Utc::now(),
        }
    }
}

/// Response from `find_game`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindGameResponse {
    /// Added to the queue, waiting for an opponent.
    Waiting,
    /// Paired. White is the player who was waiting.
    Paired {
        white: PlayerId,
        black: PlayerId,
    },
    /// The waiting player asked again and left the queue.
    Cancelled,
}

/// Holds at most one waiting player.
#[derive(Clone, Debug, Default)]
pub struct MatchmakingQueue {
    waiting: Option<QueuedPlayer>,
    matches_made: u64,
}

impl MatchmakingQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `player` in the queue or pair them with whoever is waiting.
    pub fn find_game(&mut self, player: PlayerId) -> FindGameResponse {
        match self.waiting.take() {
            None => {
                self.waiting = Some(QueuedPlayer::new(player));
                FindGameResponse::Waiting
            }
            Some(queued) if queued.player_id == player => FindGameResponse::Cancelled,
            Some(queued) => {
                self.matches_made += 1;
                tracing::debug!(
                    white = %queued.player_id,
                    black = %player,
                    waited_ms = (Utc::now() - queued.queued_at).num_milliseconds(),
                    "players paired"
                );
                FindGameResponse::Paired {
                    white: queued.player_id,
                    black: player,
                }
            }
        }
    }

    /// Drop `player` from the queue. Returns whether they were waiting.
    pub fn remove(&mut self, player: PlayerId) -> bool {
        if self.is_waiting(player) {
            self.waiting = None;
            true
        } else {
            false
        }
    }

    /// Whether `player` holds the waiting slot.
    #[must_use]
    pub fn is_waiting(&self, player: PlayerId) -> bool {
        self.waiting
            .as_ref()
            .is_some_and(|queued| queued.player_id == player)
    }

    /// The waiting entry, if any.
    #[must_use]
    pub const fn waiting(&self) -> Option<&QueuedPlayer> {
        self.waiting.as_ref()
    }

    /// Number of pairings made since the queue was created.
    #[must_use]
    pub const fn matches_made(&self) -> u64 {
        self.matches_made
    }
}
