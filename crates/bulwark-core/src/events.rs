//! Events emitted by the simulation for audio, haptic and UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Audio cues for the host's sound system. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AudioEvent {
    /// A tower fired.
    Shoot { sound: ShotSound },
    /// A single-target projectile landed.
    Impact,
    /// An area projectile detonated.
    Explosion,
    /// A tower was placed or upgraded.
    Build,
    WaveStart { boss: bool },
    WaveClear,
    /// An enemy reached the base.
    Alarm,
    /// Auto-start countdown beep.
    Tick,
    PerkPickup,
    PerkActivate { kind: PerkKind },
    /// A player action was rejected.
    Reject,
    GameOver { wave: u32 },
}

/// Vibration strength for hosts that support haptics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Haptic {
    Light,
    Medium,
    Heavy,
}

/// Alert for the UI notification queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
    pub tick: u64,
}
