//! Multiplayer relay for Bulwark.
//!
//! Pairs two players per room and keeps their wave schedules and seeds in
//! lockstep. The hub and the client state machine are pure; `server` puts the
//! hub behind a tokio TCP listener.

pub mod client;
pub mod hub;
pub mod protocol;
pub mod server;

pub use client::{ClientEvent, ConnectionStatus, MatchClient, MatchEnd};
pub use hub::{Outbound, PeerId, RelayHub};
pub use protocol::{ClientMessage, JoinStatus, ServerMessage};
pub use server::{RelayError, RelayServer};
