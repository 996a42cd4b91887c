//! Game state snapshot: the complete visible state handed to the renderer each frame.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::{Alert, AudioEvent, Haptic};
use crate::types::{EntityId, Position, SimTime};

/// Complete read-only view of the simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub theme: Theme,
    pub progress: ProgressView,
    pub path: Vec<Position>,
    pub towers: Vec<TowerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    pub floating_texts: Vec<FloatingTextView>,
    pub perk_drops: Vec<PerkDropView>,
    pub active_perks: Vec<ActivePerkView>,
    pub inventory: BTreeMap<PerkKind, u32>,
    pub alerts: Vec<Alert>,
    pub audio_events: Vec<AudioEvent>,
    pub haptics: Vec<Haptic>,
}

/// Economy and progression counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    pub money: i64,
    pub lives: i32,
    pub wave: u32,
    pub is_playing: bool,
    pub is_game_over: bool,
    /// Ticks until the next wave starts on its own; -1 when inactive.
    pub auto_start_timer: i32,
    pub game_speed: u32,
    /// Spawns still waiting in the current wave's queue.
    pub pending_spawns: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub id: EntityId,
    pub kind: TowerKind,
    pub position: Position,
    pub range: f64,
    pub damage: f64,
    pub rotation: f64,
    pub level: u8,
    /// Cost of the next upgrade, `None` at max level.
    pub upgrade_cost: Option<i64>,
    pub sell_refund: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub position: Position,
    pub hp: f64,
    pub max_hp: f64,
    pub frozen: bool,
    pub shocked: bool,
    pub color: String,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub position: Position,
    pub kind: ProjectileKind,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleView {
    pub position: Position,
    /// Remaining life as a fraction of the initial life.
    pub alpha: f64,
    pub color: String,
    pub size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingTextView {
    pub position: Position,
    pub text: String,
    pub alpha: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkDropView {
    pub id: EntityId,
    pub kind: PerkKind,
    pub position: Position,
    pub life: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePerkView {
    pub kind: PerkKind,
    pub end_tick: u64,
    pub duration: u64,
    /// Fraction of the duration still remaining, for HUD bars.
    pub remaining_ratio: f64,
}
