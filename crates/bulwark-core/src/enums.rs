//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Enemy archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyKind {
    #[default]
    Normal,
    /// Low hp, double speed. Every third spawn from wave 3.
    Fast,
    /// Heavy and slow. Every sixth spawn from wave 5.
    Tank,
    /// Closes every fifth wave.
    Boss,
}

/// Tower archetype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TowerKind {
    #[default]
    Basic,
    Laser,
    /// Cannon with splash damage.
    Aoe,
    Frost,
    Shock,
    /// Long-range splash.
    Missile,
}

impl TowerKind {
    pub const ALL: [TowerKind; 6] = [
        TowerKind::Basic,
        TowerKind::Laser,
        TowerKind::Aoe,
        TowerKind::Frost,
        TowerKind::Shock,
        TowerKind::Missile,
    ];
}

/// Collectible perk type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerkKind {
    /// Doubles tower damage while active.
    Damage,
    /// Halves tower cooldowns while active.
    Speed,
    /// Instant cash.
    Money,
    /// Instantly freezes every enemy on the field.
    Freeze,
}

impl PerkKind {
    pub const ALL: [PerkKind; 4] = [
        PerkKind::Damage,
        PerkKind::Speed,
        PerkKind::Money,
        PerkKind::Freeze,
    ];

    /// Duration perks occupy an active slot; the others resolve on activation.
    pub fn is_timed(self) -> bool {
        matches!(self, PerkKind::Damage | PerkKind::Speed)
    }
}

/// How a projectile delivers its damage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProjectileKind {
    /// Damages only the tracked target.
    Single,
    /// Damages every enemy within `blast_radius` of the impact point.
    Area { blast_radius: f64 },
}

/// Status applied to every enemy a projectile damages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEffect {
    /// Halves movement speed for a fixed number of ticks.
    Freeze,
    /// Cosmetic marker for the renderer.
    Shock,
}

/// Sound category for a tower's firing cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShotSound {
    Laser,
    Heavy,
    Normal,
}

/// Visual theme of a map, passed through to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Meadow,
    Desert,
    Tundra,
}

/// Top-level progression phase, derived from the game state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Between waves, waiting for an explicit start.
    #[default]
    Idle,
    /// Between waves with the auto-start timer running.
    Countdown,
    /// A wave is in progress.
    Playing,
    /// Lives exhausted. Only a reset leaves this phase.
    GameOver,
}

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}
