//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position on the playfield (map units, y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub DVec2);

/// 2D velocity (map units per tick).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec2);

/// Stable identifier handed out by the engine to every gameplay entity.
///
/// Identifiers are never reused within one game, so a snapshot consumer can
/// key animation state on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.0.distance(other.0)
    }

    /// Angle in radians from this position toward `other` (atan2, screen axes).
    pub fn angle_to(&self, other: &Position) -> f64 {
        let d = other.0 - self.0;
        d.y.atan2(d.x)
    }
}

impl Velocity {
    pub fn new(x: f64, y: f64) -> Self {
        Self(DVec2::new(x, y))
    }

    /// Speed magnitude (units per tick).
    pub fn speed(&self) -> f64 {
        self.0.length()
    }

    /// Velocity of magnitude `speed` pointing from `from` to `to`.
    /// Zero when the two points coincide.
    pub fn toward(from: &Position, to: &Position, speed: f64) -> Self {
        Self((to.0 - from.0).normalize_or_zero() * speed)
    }
}

impl SimTime {
    /// Seconds per tick at the fixed tick rate.
    pub fn dt(&self) -> f64 {
        1.0 / crate::constants::TICK_RATE as f64
    }

    /// Elapsed logical time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.tick as f64 * self.dt()
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
    }
}
