//! Sessions, matchmaking and the lobby that ties them together.
//!
//! - `game` - one game between two players (turn discipline, results)
//! - `matchmaking` - single-slot queue that pairs players
//! - `lobby` - event processor owning the queue and all sessions

pub mod game;
pub mod lobby;
pub mod matchmaking;

pub use game::{GameSession, MoveReport, Phase};
pub use lobby::{Dispatch, Lobby};
pub use matchmaking::{FindGameResponse, MatchmakingQueue, QueuedPlayer};
