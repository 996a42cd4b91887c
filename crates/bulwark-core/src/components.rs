//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components. Every gameplay entity also
//! carries a `Position` and an `EntityId`; projectiles and particles carry a
//! `Velocity`.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;

/// A walking enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub hp: f64,
    pub max_hp: f64,
    /// Units per tick, before the freeze slowdown.
    pub speed: f64,
    /// Index of the waypoint this enemy is walking toward.
    pub path_index: usize,
    /// Cumulative distance walked. Leader targeting picks the largest.
    pub distance_traveled: f64,
    /// Ticks of half-speed movement left.
    pub frozen_ticks: u32,
    /// Ticks of shock marker left (renderer only).
    pub shock_ticks: u32,
    pub reward: i64,
    pub color: String,
    pub radius: f64,
}

/// A placed tower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub kind: TowerKind,
    pub range: f64,
    pub damage: f64,
    /// Ticks between shots.
    pub cooldown: u32,
    /// Tick of the last shot. `None` until the first shot.
    pub last_shot_tick: Option<u64>,
    /// Facing angle in radians.
    pub rotation: f64,
    /// Upgrade tier, 1..=MAX_TOWER_LEVEL.
    pub level: u8,
    /// Purchase price, the basis of upgrade and sell math.
    pub base_cost: i64,
}

/// A homing projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    /// Enemy this projectile homes on. May no longer exist.
    pub target: EntityId,
    pub damage: f64,
    pub speed: f64,
    pub kind: ProjectileKind,
    pub effect: Option<StatusEffect>,
    pub color: String,
}

/// Cosmetic debris.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub life: u32,
    pub max_life: u32,
    pub color: String,
    pub size: f64,
}

/// Cosmetic rising text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub text: String,
    pub life: u32,
    pub color: String,
}

/// A collectible perk lying on the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerkDrop {
    pub kind: PerkKind,
    /// Ticks until the drop vanishes uncollected.
    pub life: u32,
}
