//! Relay wire protocol.
//!
//! Messages are JSON objects tagged by `type`, one per line on the stream.

use serde::{Deserialize, Serialize};

use bulwark_core::waves::WaveData;

/// Messages a game client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinGame { room_id: String },
    PlayerReady { game_id: String },
    /// Ask for the next wave once the current one is cleared.
    RequestNextWave { game_id: String },
    /// Opaque progress payload forwarded to the opponent.
    StateUpdate {
        game_id: String,
        state: serde_json::Value,
    },
    PlayerLost { game_id: String, wave: u32 },
    LeaveRoom,
}

/// Outcome of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    /// Room created; waiting for an opponent.
    Waiting,
    /// Joined an existing room; the match is paired.
    Matched,
    /// Room already holds two players.
    Full,
}

/// Messages the relay sends to a game client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    JoinResult {
        status: JoinStatus,
        player_number: Option<u8>,
        game_id: Option<String>,
    },
    OpponentJoined,
    OpponentDisconnected,
    GameStart { wave_data: WaveData },
    WaveSync { wave_data: WaveData },
    OpponentLost { wave: u32 },
    OpponentState { state: serde_json::Value },
    Error { message: String },
}

/// Encode a message as one newline-terminated JSON line.
pub fn encode_line<T: Serialize>(message: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}
