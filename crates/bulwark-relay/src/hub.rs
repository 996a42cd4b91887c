//! Room hub: matchmaking and wave barriers, independent of any transport.
//!
//! The hub pairs two peers per room and hands both the same wave schedule and
//! seed once both have asked for it. Every input returns the messages to send
//! and to whom; the server only delivers them.

use std::collections::{HashMap, HashSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use bulwark_core::constants::PLAYERS_PER_MATCH;
use bulwark_core::waves::{build_spawn_queue, WaveData};

use crate::protocol::{ClientMessage, JoinStatus, ServerMessage};

/// Connection identifier assigned by the transport.
pub type PeerId = u64;

/// A message addressed to one peer.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub peer: PeerId,
    pub message: ServerMessage,
}

impl Outbound {
    fn to(peer: PeerId, message: ServerMessage) -> Self {
        Self { peer, message }
    }
}

#[derive(Debug)]
struct Room {
    room_id: String,
    game_id: String,
    /// Join order; index 0 is player 1.
    players: Vec<PeerId>,
    ready: HashSet<PeerId>,
    started: bool,
    wave: u32,
    wave_requests: HashSet<PeerId>,
}

impl Room {
    fn opponent_of(&self, peer: PeerId) -> Option<PeerId> {
        self.players.iter().copied().find(|p| *p != peer)
    }

    fn broadcast(&self, message: ServerMessage) -> Vec<Outbound> {
        self.players
            .iter()
            .map(|p| Outbound::to(*p, message.clone()))
            .collect()
    }
}

/// Matchmaking state for every open room.
pub struct RelayHub {
    /// Keyed by game id.
    rooms: HashMap<String, Room>,
    /// Room id → game id for rooms still accepting or holding players.
    room_games: HashMap<String, String>,
    /// Peer → game id of the room it sits in.
    peer_games: HashMap<PeerId, String>,
    rng: ChaCha8Rng,
    next_game: u64,
}

impl RelayHub {
    pub fn new(seed: u64) -> Self {
        Self {
            rooms: HashMap::new(),
            room_games: HashMap::new(),
            peer_games: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_game: 1,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Game id of the room `peer` is in, if any.
    pub fn game_of(&self, peer: PeerId) -> Option<&str> {
        self.peer_games.get(&peer).map(String::as_str)
    }

    /// Apply one client message and return the resulting deliveries.
    pub fn handle(&mut self, peer: PeerId, message: ClientMessage) -> Vec<Outbound> {
        match message {
            ClientMessage::JoinGame { room_id } => self.join(peer, room_id),
            ClientMessage::PlayerReady { game_id } => self.ready(peer, &game_id),
            ClientMessage::RequestNextWave { game_id } => self.request_next_wave(peer, &game_id),
            ClientMessage::StateUpdate { game_id, state } => {
                self.forward(peer, &game_id, ServerMessage::OpponentState { state })
            }
            ClientMessage::PlayerLost { game_id, wave } => self.player_lost(peer, &game_id, wave),
            ClientMessage::LeaveRoom => self.depart(peer),
        }
    }

    /// The transport lost `peer`.
    pub fn disconnect(&mut self, peer: PeerId) -> Vec<Outbound> {
        self.depart(peer)
    }

    fn join(&mut self, peer: PeerId, room_id: String) -> Vec<Outbound> {
        if self.peer_games.contains_key(&peer) {
            return reject(peer, "already in a room");
        }

        if let Some(game_id) = self.room_games.get(&room_id).cloned() {
            let Some(room) = self.rooms.get_mut(&game_id) else {
                return reject(peer, "room vanished");
            };
            if room.players.len() >= PLAYERS_PER_MATCH {
                return vec![Outbound::to(
                    peer,
                    ServerMessage::JoinResult {
                        status: JoinStatus::Full,
                        player_number: None,
                        game_id: None,
                    },
                )];
            }

            room.players.push(peer);
            self.peer_games.insert(peer, game_id.clone());
            info!(room = %room_id, game = %game_id, "match paired");

            let mut out = vec![Outbound::to(
                peer,
                ServerMessage::JoinResult {
                    status: JoinStatus::Matched,
                    player_number: Some(room.players.len() as u8),
                    game_id: Some(game_id),
                },
            )];
            if let Some(host) = room.opponent_of(peer) {
                out.push(Outbound::to(host, ServerMessage::OpponentJoined));
            }
            return out;
        }

        let game_id = format!("{room_id}-{}", self.next_game);
        self.next_game += 1;
        self.rooms.insert(
            game_id.clone(),
            Room {
                room_id: room_id.clone(),
                game_id: game_id.clone(),
                players: vec![peer],
                ready: HashSet::new(),
                started: false,
                wave: 0,
                wave_requests: HashSet::new(),
            },
        );
        self.room_games.insert(room_id.clone(), game_id.clone());
        self.peer_games.insert(peer, game_id.clone());
        info!(room = %room_id, game = %game_id, "room opened");

        vec![Outbound::to(
            peer,
            ServerMessage::JoinResult {
                status: JoinStatus::Waiting,
                player_number: Some(1),
                game_id: Some(game_id),
            },
        )]
    }

    fn ready(&mut self, peer: PeerId, game_id: &str) -> Vec<Outbound> {
        let Some(room) = self.member_room(peer, game_id) else {
            return reject(peer, "not in that game");
        };
        room.ready.insert(peer);
        if room.started || room.ready.len() < PLAYERS_PER_MATCH {
            return Vec::new();
        }

        room.started = true;
        room.wave = 1;
        info!(game = %room.game_id, "match started");
        let game_id = room.game_id.clone();
        let wave_data = self.wave_data(1);
        self.rooms
            .get(&game_id)
            .map(|room| room.broadcast(ServerMessage::GameStart { wave_data }))
            .unwrap_or_default()
    }

    fn request_next_wave(&mut self, peer: PeerId, game_id: &str) -> Vec<Outbound> {
        let Some(room) = self.member_room(peer, game_id) else {
            return reject(peer, "not in that game");
        };
        if !room.started {
            return reject(peer, "match has not started");
        }
        room.wave_requests.insert(peer);
        if room.wave_requests.len() < PLAYERS_PER_MATCH {
            return Vec::new();
        }

        room.wave_requests.clear();
        room.wave += 1;
        let wave = room.wave;
        let game_id = room.game_id.clone();
        let wave_data = self.wave_data(wave);
        info!(game = %game_id, wave, "wave synced");
        self.rooms
            .get(&game_id)
            .map(|room| room.broadcast(ServerMessage::WaveSync { wave_data }))
            .unwrap_or_default()
    }

    fn forward(&mut self, peer: PeerId, game_id: &str, message: ServerMessage) -> Vec<Outbound> {
        let Some(room) = self.member_room(peer, game_id) else {
            return reject(peer, "not in that game");
        };
        room.opponent_of(peer)
            .map(|opponent| vec![Outbound::to(opponent, message)])
            .unwrap_or_default()
    }

    /// A loss ends the match: the opponent is told and the room closes.
    fn player_lost(&mut self, peer: PeerId, game_id: &str, wave: u32) -> Vec<Outbound> {
        let Some(room) = self.member_room(peer, game_id) else {
            return reject(peer, "not in that game");
        };
        let out = room
            .opponent_of(peer)
            .map(|opponent| vec![Outbound::to(opponent, ServerMessage::OpponentLost { wave })])
            .unwrap_or_default();

        let game_id = room.game_id.clone();
        info!(game = %game_id, peer, wave, "match finished");
        self.close(&game_id);
        out
    }

    /// Remove `peer` from its room. Before pairing this frees the room; after
    /// pairing it ends the match for the opponent too.
    fn depart(&mut self, peer: PeerId) -> Vec<Outbound> {
        let Some(game_id) = self.peer_games.get(&peer).cloned() else {
            return Vec::new();
        };
        let opponent = self.rooms.get(&game_id).and_then(|room| room.opponent_of(peer));
        self.close(&game_id);

        match opponent {
            Some(opponent) => {
                info!(game = %game_id, peer, "peer left mid-match");
                vec![Outbound::to(opponent, ServerMessage::OpponentDisconnected)]
            }
            None => {
                info!(game = %game_id, peer, "room released");
                Vec::new()
            }
        }
    }

    fn close(&mut self, game_id: &str) {
        if let Some(room) = self.rooms.remove(game_id) {
            for player in &room.players {
                self.peer_games.remove(player);
            }
            if self.room_games.get(&room.room_id).map(String::as_str) == Some(game_id) {
                self.room_games.remove(&room.room_id);
            }
        }
    }

    fn member_room(&mut self, peer: PeerId, game_id: &str) -> Option<&mut Room> {
        if self.peer_games.get(&peer).map(String::as_str) != Some(game_id) {
            warn!(peer, game = %game_id, "message for a game the peer is not in");
            return None;
        }
        self.rooms.get_mut(game_id)
    }

    fn wave_data(&mut self, wave: u32) -> WaveData {
        WaveData {
            wave,
            enemies: build_spawn_queue(wave).into_iter().collect(),
            seed: self.rng.gen(),
        }
    }
}

fn reject(peer: PeerId, message: &str) -> Vec<Outbound> {
    vec![Outbound::to(
        peer,
        ServerMessage::Error {
            message: message.to_string(),
        },
    )]
}
