//! Rejection reasons for player actions.
//!
//! Invalid actions never mutate state. The engine reports them to the caller
//! and emits a rejection cue.

use serde::{Deserialize, Serialize};

use crate::enums::PerkKind;
use crate::types::EntityId;

/// Why a player action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum ActionError {
    InsufficientFunds { needed: i64, available: i64 },
    /// Candidate cell lies outside the playfield.
    OutOfBounds,
    /// Candidate cell is too close to the enemy path.
    BlockedByPath,
    /// Candidate cell is too close to another tower.
    BlockedByTower,
    /// Tower is already at the maximum level.
    MaxLevel,
    UnknownTower { id: EntityId },
    /// No unit of this perk in the inventory.
    EmptyPerk { kind: PerkKind },
    /// A wave is already running.
    WaveInProgress,
    /// The game has ended; only a reset is accepted.
    GameOver,
    /// Game speed outside the supported set.
    InvalidSpeed { speed: u32 },
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::InsufficientFunds { needed, available } => {
                write!(f, "insufficient funds: need {needed}, have {available}")
            }
            ActionError::OutOfBounds => write!(f, "outside the playfield"),
            ActionError::BlockedByPath => write!(f, "too close to the enemy path"),
            ActionError::BlockedByTower => write!(f, "too close to another tower"),
            ActionError::MaxLevel => write!(f, "tower is already at max level"),
            ActionError::UnknownTower { id } => write!(f, "no tower with id {}", id.0),
            ActionError::EmptyPerk { kind } => write!(f, "no {kind:?} perk in inventory"),
            ActionError::WaveInProgress => write!(f, "a wave is already in progress"),
            ActionError::GameOver => write!(f, "game is over"),
            ActionError::InvalidSpeed { speed } => write!(f, "unsupported game speed {speed}"),
        }
    }
}

impl std::error::Error for ActionError {}
