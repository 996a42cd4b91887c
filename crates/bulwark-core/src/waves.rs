//! Wave scheduler: the spawn queue for a wave number.
//!
//! Pure functions with no engine dependency, shared by the simulation and the
//! relay so both peers of a match derive identical schedules.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::EnemyKind;

/// One pending spawn: the enemy kind and the ticks to wait before it appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: EnemyKind,
    pub delay: u32,
}

/// Wave payload exchanged through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveData {
    pub wave: u32,
    pub enemies: Vec<SpawnEntry>,
    pub seed: u64,
}

/// True for waves that end with a boss.
pub fn is_boss_wave(wave: u32) -> bool {
    wave > 0 && wave % BOSS_WAVE_INTERVAL == 0
}

/// Number of enemies in `wave`.
pub fn enemy_count(wave: u32) -> usize {
    (WAVE_BASE_COUNT as f64 + (wave as f64 * WAVE_COUNT_PER_WAVE).floor()) as usize
}

/// Build the spawn queue for `wave`.
///
/// Rules are applied in a fixed order per slot: fast, then tank (so a tank
/// wins on slots divisible by both 3 and 6), then the boss override on the
/// last slot of boss waves. The first slot always spawns immediately.
pub fn build_spawn_queue(wave: u32) -> VecDeque<SpawnEntry> {
    let count = enemy_count(wave);
    let boss = is_boss_wave(wave);

    (0..count)
        .map(|i| {
            let mut kind = EnemyKind::Normal;
            let mut delay = SPAWN_DELAY_DEFAULT;

            if wave > FAST_AFTER_WAVE && i % 3 == 0 {
                kind = EnemyKind::Fast;
                delay = SPAWN_DELAY_FAST;
            }
            if wave > TANK_AFTER_WAVE && i % 6 == 0 {
                kind = EnemyKind::Tank;
                delay = SPAWN_DELAY_TANK;
            }
            if boss && i == count - 1 {
                kind = EnemyKind::Boss;
                delay = SPAWN_DELAY_BOSS;
            }
            if i == 0 {
                delay = 0;
            }

            SpawnEntry { kind, delay }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_follows_formula() {
        for wave in 0..40 {
            let q = build_spawn_queue(wave);
            assert_eq!(q.len(), 5 + (wave as f64 * 1.5).floor() as usize);
            assert_eq!(q[0].delay, 0, "wave {wave} first entry must spawn at once");
        }
    }

    #[test]
    fn early_waves_are_all_normal() {
        let q = build_spawn_queue(1);
        assert_eq!(q.len(), 6);
        assert!(q.iter().all(|e| e.kind == EnemyKind::Normal));
        assert!(q.iter().skip(1).all(|e| e.delay == 30));
    }

    #[test]
    fn wave_three_has_fast_every_third() {
        let q = build_spawn_queue(3);
        assert_eq!(q.len(), 9);
        assert_eq!(q[0].kind, EnemyKind::Fast);
        assert_eq!(q[3].kind, EnemyKind::Fast);
        assert_eq!(q[3].delay, 15);
        assert_eq!(q[6].kind, EnemyKind::Fast);
        assert_eq!(q[1].kind, EnemyKind::Normal);
        assert_eq!(q[1].delay, 30);
    }

    #[test]
    fn boss_wave_overrides_last_slot() {
        let q = build_spawn_queue(5);
        assert_eq!(q.len(), 12);
        let last = q.back().unwrap();
        assert_eq!(last.kind, EnemyKind::Boss);
        assert_eq!(last.delay, 120);
        // Tank wins over fast on index 6.
        assert_eq!(q[6].kind, EnemyKind::Tank);
        assert_eq!(q[6].delay, 60);
        assert_eq!(q[3].kind, EnemyKind::Fast);
    }

    #[test]
    fn boss_wave_detection() {
        assert!(!is_boss_wave(0));
        assert!(!is_boss_wave(4));
        assert!(is_boss_wave(5));
        assert!(is_boss_wave(10));
        assert!(!is_boss_wave(11));
    }
}
