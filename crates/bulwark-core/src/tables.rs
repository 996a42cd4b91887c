//! Static stat tables for enemy and tower archetypes.

use serde::Serialize;

use crate::enums::{EnemyKind, ProjectileKind, ShotSound, StatusEffect, TowerKind};

/// Base stats of an enemy archetype, before wave scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnemyStats {
    pub hp: f64,
    /// Units per tick.
    pub speed: f64,
    pub reward: i64,
    pub color: &'static str,
    pub radius: f64,
}

/// How a tower's projectiles behave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Archetype {
    Single,
    /// Splash with radius `base + level * per_level`.
    Area { base: f64, per_level: f64 },
}

/// Base stats of a tower archetype at level 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TowerStats {
    pub cost: i64,
    pub range: f64,
    pub damage: f64,
    /// Ticks between shots.
    pub cooldown: u32,
    pub projectile_speed: f64,
    pub archetype: Archetype,
    pub effect: Option<StatusEffect>,
    pub sound: ShotSound,
    pub color: &'static str,
}

impl EnemyStats {
    pub fn for_kind(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Normal => Self {
                hp: 30.0,
                speed: 1.5,
                reward: 10,
                color: "#ef4444",
                radius: 10.0,
            },
            EnemyKind::Fast => Self {
                hp: 20.0,
                speed: 3.0,
                reward: 15,
                color: "#facc15",
                radius: 8.0,
            },
            EnemyKind::Tank => Self {
                hp: 120.0,
                speed: 0.8,
                reward: 30,
                color: "#6b7280",
                radius: 14.0,
            },
            EnemyKind::Boss => Self {
                hp: 800.0,
                speed: 0.6,
                reward: 200,
                color: "#a855f7",
                radius: 22.0,
            },
        }
    }

    /// Hit points for this archetype in `wave`: base + base * wave * 0.35.
    pub fn scaled_hp(&self, wave: u32) -> f64 {
        self.hp + self.hp * (wave as f64 * crate::constants::HP_SCALE_PER_WAVE)
    }
}

impl TowerStats {
    pub fn for_kind(kind: TowerKind) -> Self {
        match kind {
            TowerKind::Basic => Self {
                cost: 50,
                range: 120.0,
                damage: 10.0,
                cooldown: 30,
                projectile_speed: 8.0,
                archetype: Archetype::Single,
                effect: None,
                sound: ShotSound::Normal,
                color: "#3b82f6",
            },
            TowerKind::Laser => Self {
                cost: 120,
                range: 150.0,
                damage: 6.0,
                cooldown: 8,
                projectile_speed: 14.0,
                archetype: Archetype::Single,
                effect: None,
                sound: ShotSound::Laser,
                color: "#f43f5e",
            },
            TowerKind::Aoe => Self {
                cost: 150,
                range: 110.0,
                damage: 20.0,
                cooldown: 60,
                projectile_speed: 6.0,
                archetype: Archetype::Area {
                    base: 60.0,
                    per_level: 10.0,
                },
                effect: None,
                sound: ShotSound::Heavy,
                color: "#f97316",
            },
            TowerKind::Frost => Self {
                cost: 100,
                range: 100.0,
                damage: 4.0,
                cooldown: 40,
                projectile_speed: 7.0,
                archetype: Archetype::Single,
                effect: Some(StatusEffect::Freeze),
                sound: ShotSound::Normal,
                color: "#67e8f9",
            },
            TowerKind::Shock => Self {
                cost: 140,
                range: 130.0,
                damage: 14.0,
                cooldown: 35,
                projectile_speed: 12.0,
                archetype: Archetype::Single,
                effect: Some(StatusEffect::Shock),
                sound: ShotSound::Laser,
                color: "#fde047",
            },
            TowerKind::Missile => Self {
                cost: 250,
                range: 220.0,
                damage: 45.0,
                cooldown: 90,
                projectile_speed: 5.0,
                archetype: Archetype::Area {
                    base: 80.0,
                    per_level: 15.0,
                },
                effect: None,
                sound: ShotSound::Heavy,
                color: "#84cc16",
            },
        }
    }

    /// Projectile kind fired by a tower of this archetype at `level`.
    pub fn projectile_kind(&self, level: u8) -> ProjectileKind {
        match self.archetype {
            Archetype::Single => ProjectileKind::Single,
            Archetype::Area { base, per_level } => ProjectileKind::Area {
                blast_radius: base + level as f64 * per_level,
            },
        }
    }
}

/// Money needed to raise a tower from `level` to `level + 1`.
pub fn upgrade_cost(base_cost: i64, level: u8) -> i64 {
    (base_cost as f64 * crate::constants::UPGRADE_COST_FACTOR * level as f64).floor() as i64
}

/// Money returned when selling a tower at `level`.
pub fn sell_refund(base_cost: i64, level: u8) -> i64 {
    (base_cost as f64 * crate::constants::SELL_REFUND_FACTOR * level as f64).floor() as i64
}
