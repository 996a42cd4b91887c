//! Perk inventory and timed perk effects.
//!
//! Stored in `SimulationEngine`, NOT as ECS entities. Drops lying on the
//! field are entities; once picked up they become inventory counts here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bulwark_core::constants::{DAMAGE_PERK_MULTIPLIER, SPEED_PERK_DIVISOR, TIMED_PERK_TICKS};
use bulwark_core::enums::PerkKind;
use bulwark_core::error::ActionError;

/// A running duration perk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePerk {
    pub kind: PerkKind,
    /// Tick at which the effect ends.
    pub end_tick: u64,
    pub duration: u64,
}

/// Global combat modifiers derived from the active perks for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatModifiers {
    pub damage_multiplier: f64,
    pub cooldown_divisor: f64,
}

impl Default for CombatModifiers {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            cooldown_divisor: 1.0,
        }
    }
}

/// Collected perks and the currently running timed effects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerkState {
    inventory: BTreeMap<PerkKind, u32>,
    active: Vec<ActivePerk>,
}

impl PerkState {
    /// Add one collected unit.
    pub fn add(&mut self, kind: PerkKind) {
        *self.inventory.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: PerkKind) -> u32 {
        self.inventory.get(&kind).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> &BTreeMap<PerkKind, u32> {
        &self.inventory
    }

    pub fn active(&self) -> &[ActivePerk] {
        &self.active
    }

    /// Consume exactly one unit, or reject if none is held.
    pub fn take(&mut self, kind: PerkKind) -> Result<(), ActionError> {
        match self.inventory.get_mut(&kind) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Ok(())
            }
            _ => Err(ActionError::EmptyPerk { kind }),
        }
    }

    /// Start (or restart) a timed perk. At most one entry per kind exists.
    pub fn install(&mut self, kind: PerkKind, now: u64) {
        self.active.retain(|p| p.kind != kind);
        self.active.push(ActivePerk {
            kind,
            end_tick: now + TIMED_PERK_TICKS,
            duration: TIMED_PERK_TICKS,
        });
    }

    /// Drop every timed perk whose end tick has been reached.
    pub fn sweep(&mut self, now: u64) {
        self.active.retain(|p| p.end_tick > now);
    }

    pub fn is_active(&self, kind: PerkKind) -> bool {
        self.active.iter().any(|p| p.kind == kind)
    }

    pub fn modifiers(&self) -> CombatModifiers {
        let mut mods = CombatModifiers::default();
        if self.is_active(PerkKind::Damage) {
            mods.damage_multiplier = DAMAGE_PERK_MULTIPLIER;
        }
        if self.is_active(PerkKind::Speed) {
            mods.cooldown_divisor = SPEED_PERK_DIVISOR;
        }
        mods
    }
}
