//! Player commands sent from the host to the simulation.
//!
//! Commands are validated and queued for processing at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;
use crate::waves::WaveData;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Waves ---
    /// Start the next wave now, cancelling any auto-start countdown.
    StartWave,
    /// Start a wave with a schedule received from the relay.
    StartSyncedWave { wave_data: WaveData },

    // --- Building ---
    /// Place a tower at the grid cell containing (x, y).
    PlaceTower { kind: TowerKind, x: f64, y: f64 },
    UpgradeTower { tower_id: EntityId },
    SellTower { tower_id: EntityId },

    // --- Perks ---
    /// Collect every perk drop within pickup radius of (x, y).
    PickupDrop { x: f64, y: f64 },
    ActivatePerk { kind: PerkKind },

    // --- Simulation control ---
    /// Set the logic-rate multiplier (1 or 2).
    SetGameSpeed { speed: u32 },
    /// Discard the current game and start over.
    Reset,
}
