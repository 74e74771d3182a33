//! The hub: one task that owns the lobby and every connection's outbox.
//!
//! Connections never touch game state. They post [`HubEvent`]s and the hub
//! handles each one to completion, in arrival order, before taking the next.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::fog::Visibility;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::lobby::{Dispatch, Lobby};
use crate::types::chess::MoveRequest;
use crate::types::game::GameId;
use crate::types::player::PlayerId;

/// Something the hub has to react to.
#[derive(Debug)]
pub enum HubEvent {
    /// A new connection and the channel its messages go to.
    Connected {
        player: PlayerId,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    },
    /// A parsed client request.
    Message {
        player: PlayerId,
        message: ClientMessage,
    },
    /// The connection went away.
    Disconnected { player: PlayerId },
    /// A finished game's grace window ran out.
    Expire { game_id: GameId },
    /// Snapshot request.
    Stats { reply: oneshot::Sender<HubStats> },
}

impl HubEvent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Message { .. } => "message",
            Self::Disconnected { .. } => "disconnected",
            Self::Expire { .. } => "expire",
            Self::Stats { .. } => "stats",
        }
    }
}

/// Counters reported by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub connections: usize,
    pub games: usize,
    pub matches_made: u64,
}

/// Cheap, cloneable way to talk to the hub.
#[derive(Clone, Debug)]
pub struct HubHandle {
    events: mpsc::UnboundedSender<HubEvent>,
}

/// A registered connection.
#[derive(Debug)]
pub struct Connection {
    pub player: PlayerId,
    /// Sender into this connection's own outbox, for local replies.
    pub outbox: mpsc::UnboundedSender<ServerMessage>,
    /// Everything addressed to this player.
    pub inbox: mpsc::UnboundedReceiver<ServerMessage>,
}

impl HubHandle {
    /// Register a new player. `None` once the hub has stopped.
    pub fn connect(&self) -> Option<Connection> {
        let player = PlayerId::new();
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.events
            .send(HubEvent::Connected {
                player,
                outbox: outbox.clone(),
            })
            .ok()?;
        Some(Connection {
            player,
            outbox,
            inbox,
        })
    }

    /// Forward a request. Returns false once the hub has stopped.
    pub fn send(&self, player: PlayerId, message: ClientMessage) -> bool {
        self.events
            .send(HubEvent::Message { player, message })
            .is_ok()
    }

    /// Report a dropped connection.
    pub fn disconnect(&self, player: PlayerId) {
        let _ = self.events.send(HubEvent::Disconnected { player });
    }

    /// Current counters, `None` once the hub has stopped.
    pub async fn stats(&self) -> Option<HubStats> {
        let (reply, rx) = oneshot::channel();
        self.events.send(HubEvent::Stats { reply }).ok()?;
        rx.await.ok()
    }
}

/// Owner of the lobby and all connection outboxes.
pub struct Hub<V: Visibility> {
    lobby: Lobby<V>,
    connections: HashMap<PlayerId, mpsc::UnboundedSender<ServerMessage>>,
    events_tx: mpsc::UnboundedSender<HubEvent>,
    events_rx: mpsc::UnboundedReceiver<HubEvent>,
    grace_period: Duration,
    cancel: CancellationToken,
}

impl<V: Visibility> Hub<V> {
    /// Create a hub and a handle for connections to use.
    pub fn new(
        lobby: Lobby<V>,
        grace_period: Duration,
        cancel: CancellationToken,
    ) -> (Self, HubHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let handle = HubHandle {
            events: events_tx.clone(),
        };
        let hub = Self {
            lobby,
            connections: HashMap::new(),
            events_tx,
            events_rx,
            grace_period,
            cancel,
        };
        (hub, handle)
    }

    /// Process events until cancelled.
    pub async fn run(mut self) {
        tracing::debug!("hub started");
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = self.events_rx.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
        tracing::debug!(
            connections = self.connections.len(),
            games = self.lobby.game_count(),
            "hub stopped"
        );
    }

    #[instrument(level = "debug", skip(self, event), fields(kind = event.kind()))]
    fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Connected { player, outbox } => {
                tracing::debug!(player = %player, "connected");
                self.connections.insert(player, outbox);
            }
            HubEvent::Message { player, message } => {
                let dispatch = match message {
                    ClientMessage::FindGame => self.lobby.find_game(player),
                    ClientMessage::MakeMove {
                        game_id,
                        from,
                        to,
                        promotion,
                    } => {
                        let request = MoveRequest {
                            from,
                            to,
                            promotion,
                        };
                        self.lobby.make_move(player, game_id, request)
                    }
                    ClientMessage::Resign { game_id } => self.lobby.resign(player, game_id),
                };
                self.deliver(dispatch);
            }
            HubEvent::Disconnected { player } => {
                tracing::debug!(player = %player, "disconnected");
                self.connections.remove(&player);
                let dispatch = self.lobby.disconnect(player);
                self.deliver(dispatch);
            }
            HubEvent::Expire { game_id } => {
                self.lobby.expire(game_id);
            }
            HubEvent::Stats { reply } => {
                let _ = reply.send(HubStats {
                    connections: self.connections.len(),
                    games: self.lobby.game_count(),
                    matches_made: self.lobby.matches_made(),
                });
            }
        }
    }

    fn deliver(&mut self, dispatch: Dispatch) {
        for (player, message) in dispatch.messages {
            let delivered = self
                .connections
                .get(&player)
                .is_some_and(|outbox| outbox.send(message).is_ok());
            if !delivered {
                tracing::debug!(player = %player, "dropping message for closed connection");
            }
        }
        if let Some(game_id) = dispatch.expire {
            self.schedule_expiry(game_id);
        }
    }

    fn schedule_expiry(&self, game_id: GameId) {
        let deadline = Instant::now() + self.grace_period;
        let events = self.events_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    let _ = events.send(HubEvent::Expire { game_id });
                }
            }
        });
    }
}
