//! Client-side match state machine.
//!
//! Transport agnostic: the host feeds it server messages and ticks, and
//! drains the outgoing messages it queues. Wave payloads come back as
//! `ClientEvent::StartWave`, ready to turn into a sim command.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bulwark_core::commands::PlayerCommand;
use bulwark_core::constants::JOIN_TIMEOUT_TICKS;
use bulwark_core::waves::WaveData;

use crate::protocol::{ClientMessage, JoinStatus, ServerMessage};

/// How a match ended for this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchEnd {
    OpponentDisconnected,
    /// The opponent's base fell first.
    Won { opponent_wave: u32 },
    Lost { wave: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionStatus {
    Disconnected,
    /// Join sent, no answer yet.
    Connecting,
    /// In a room, waiting for an opponent.
    Waiting,
    /// Paired; waiting for both players to be ready.
    Matched,
    InMatch,
    /// The attempt failed in a way a fresh join may fix.
    Retryable(String),
    Ended(MatchEnd),
}

/// Something the host should act on.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StartWave(WaveData),
    OpponentState(serde_json::Value),
    StatusChanged(ConnectionStatus),
}

impl ClientEvent {
    /// The sim command this event maps to, if any.
    pub fn into_command(self) -> Option<PlayerCommand> {
        match self {
            ClientEvent::StartWave(wave_data) => Some(PlayerCommand::StartSyncedWave { wave_data }),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct MatchClient {
    status: ConnectionStatus,
    room_id: Option<String>,
    game_id: Option<String>,
    player_number: Option<u8>,
    join_ticks: u64,
    outbox: VecDeque<ClientMessage>,
}

impl Default for MatchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchClient {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            room_id: None,
            game_id: None,
            player_number: None,
            join_ticks: 0,
            outbox: VecDeque::new(),
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }

    pub fn player_number(&self) -> Option<u8> {
        self.player_number
    }

    /// Ask to join `room_id`, discarding any previous match.
    pub fn join(&mut self, room_id: impl Into<String>) {
        let room_id = room_id.into();
        self.game_id = None;
        self.player_number = None;
        self.join_ticks = 0;
        self.outbox.push_back(ClientMessage::JoinGame {
            room_id: room_id.clone(),
        });
        self.room_id = Some(room_id);
        self.status = ConnectionStatus::Connecting;
    }

    /// Announce readiness. Returns false if there is no game to be ready for.
    pub fn ready(&mut self) -> bool {
        self.send_in_game(|game_id| ClientMessage::PlayerReady { game_id })
    }

    /// Ask for the next wave after clearing the current one.
    pub fn request_next_wave(&mut self) -> bool {
        self.send_in_game(|game_id| ClientMessage::RequestNextWave { game_id })
    }

    pub fn report_state(&mut self, state: serde_json::Value) -> bool {
        self.send_in_game(|game_id| ClientMessage::StateUpdate { game_id, state })
    }

    /// Report the local game over and end the match on this side.
    pub fn report_lost(&mut self, wave: u32) -> bool {
        let sent = self.send_in_game(|game_id| ClientMessage::PlayerLost { game_id, wave });
        if sent {
            self.game_id = None;
            self.status = ConnectionStatus::Ended(MatchEnd::Lost { wave });
        }
        sent
    }

    pub fn leave(&mut self) {
        if self.room_id.is_some() {
            self.outbox.push_back(ClientMessage::LeaveRoom);
        }
        self.room_id = None;
        self.game_id = None;
        self.player_number = None;
        self.status = ConnectionStatus::Disconnected;
    }

    /// The transport failed underneath the client.
    pub fn transport_failed(&mut self, reason: impl Into<String>) -> ClientEvent {
        self.room_id = None;
        self.game_id = None;
        self.set_status(ConnectionStatus::Retryable(reason.into()))
    }

    /// Advance the join timeout by one tick.
    pub fn tick(&mut self) -> Option<ClientEvent> {
        if self.status != ConnectionStatus::Connecting {
            return None;
        }
        self.join_ticks += 1;
        if self.join_ticks >= JOIN_TIMEOUT_TICKS {
            warn!(room = ?self.room_id, "join timed out");
            return Some(self.set_status(ConnectionStatus::Retryable("join timed out".into())));
        }
        None
    }

    /// Messages queued for the relay, oldest first.
    pub fn drain_outbox(&mut self) -> Vec<ClientMessage> {
        self.outbox.drain(..).collect()
    }

    /// Apply one message from the relay.
    pub fn handle(&mut self, message: ServerMessage) -> Option<ClientEvent> {
        match message {
            ServerMessage::JoinResult {
                status,
                player_number,
                game_id,
            } => {
                self.player_number = player_number;
                self.game_id = game_id;
                let next = match status {
                    JoinStatus::Waiting => ConnectionStatus::Waiting,
                    JoinStatus::Matched => ConnectionStatus::Matched,
                    JoinStatus::Full => ConnectionStatus::Retryable("room full".into()),
                };
                Some(self.set_status(next))
            }
            ServerMessage::OpponentJoined => Some(self.set_status(ConnectionStatus::Matched)),
            ServerMessage::GameStart { wave_data } => {
                self.status = ConnectionStatus::InMatch;
                Some(ClientEvent::StartWave(wave_data))
            }
            ServerMessage::WaveSync { wave_data } => {
                if self.status != ConnectionStatus::InMatch {
                    warn!(wave = wave_data.wave, "wave sync outside a match");
                    return None;
                }
                Some(ClientEvent::StartWave(wave_data))
            }
            ServerMessage::OpponentState { state } => Some(ClientEvent::OpponentState(state)),
            ServerMessage::OpponentLost { wave } => self.end_match(MatchEnd::Won {
                opponent_wave: wave,
            }),
            ServerMessage::OpponentDisconnected => self.end_match(MatchEnd::OpponentDisconnected),
            ServerMessage::Error { message } => {
                warn!(%message, "relay error");
                if self.status == ConnectionStatus::Connecting {
                    return Some(self.set_status(ConnectionStatus::Retryable(message)));
                }
                None
            }
        }
    }

    fn send_in_game(&mut self, build: impl FnOnce(String) -> ClientMessage) -> bool {
        match &self.game_id {
            Some(game_id) => {
                self.outbox.push_back(build(game_id.clone()));
                true
            }
            None => {
                debug!("no game to send to");
                false
            }
        }
    }

    /// Record how the match ended. The first outcome sticks.
    fn end_match(&mut self, end: MatchEnd) -> Option<ClientEvent> {
        if let ConnectionStatus::Ended(previous) = &self.status {
            debug!(?previous, ignored = ?end, "match already ended");
            return None;
        }
        self.game_id = None;
        Some(self.set_status(ConnectionStatus::Ended(end)))
    }

    fn set_status(&mut self, status: ConnectionStatus) -> ClientEvent {
        debug!(?status, "relay status");
        self.status = status.clone();
        ClientEvent::StatusChanged(status)
    }
}
