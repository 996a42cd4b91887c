//! Fire control: tower targeting, cooldown gating and projectile launch.
//!
//! Targeting is "leader" priority: among enemies in range, the one that has
//! walked furthest along the path. Ties go to the lower entity id so the
//! choice never depends on storage order.

use glam::DVec2;
use hecs::World;

use bulwark_core::components::{Enemy, Tower};
use bulwark_core::constants::MUZZLE_OFFSET;
use bulwark_core::events::AudioEvent;
use bulwark_core::tables::TowerStats;
use bulwark_core::types::{EntityId, Position};

use crate::perks::CombatModifiers;
use crate::world_setup::{self, Shot};

/// Minimal view of an enemy for target selection.
#[derive(Debug, Clone, Copy)]
pub struct TargetCandidate {
    pub id: EntityId,
    pub position: Position,
    pub distance_traveled: f64,
}

/// Pick the leader among `candidates` within `range` of `origin`.
pub fn select_target(
    origin: &Position,
    range: f64,
    candidates: &[TargetCandidate],
) -> Option<TargetCandidate> {
    candidates
        .iter()
        .filter(|c| origin.distance_to(&c.position) <= range)
        .fold(None, |best: Option<TargetCandidate>, c| match best {
            Some(b)
                if b.distance_traveled > c.distance_traveled
                    || (b.distance_traveled == c.distance_traveled && b.id < c.id) =>
            {
                Some(b)
            }
            _ => Some(*c),
        })
}

/// Cooldown gate: a tower may fire once `last + cooldown / divisor <= now`.
pub fn ready_to_fire(tower: &Tower, divisor: f64, now: u64) -> bool {
    match tower.last_shot_tick {
        None => true,
        Some(last) => last as f64 + tower.cooldown as f64 / divisor <= now as f64,
    }
}

/// Run the fire control system for one tick.
pub fn run(
    world: &mut World,
    next_id: &mut u32,
    modifiers: CombatModifiers,
    now: u64,
    emit_cues: bool,
    audio_events: &mut Vec<AudioEvent>,
) {
    let candidates: Vec<TargetCandidate> = world
        .query::<(&EntityId, &Position, &Enemy)>()
        .iter()
        .map(|(_, (id, pos, enemy))| TargetCandidate {
            id: *id,
            position: *pos,
            distance_traveled: enemy.distance_traveled,
        })
        .collect();

    if candidates.is_empty() {
        return;
    }

    let mut shots: Vec<(EntityId, Shot)> = Vec::new();

    for (_entity, (tower_id, pos, tower)) in
        world.query_mut::<(&EntityId, &Position, &mut Tower)>()
    {
        let Some(target) = select_target(pos, tower.range, &candidates) else {
            continue;
        };

        tower.rotation = pos.angle_to(&target.position);

        if !ready_to_fire(tower, modifiers.cooldown_divisor, now) {
            continue;
        }
        tower.last_shot_tick = Some(now);

        let stats = TowerStats::for_kind(tower.kind);
        let muzzle = Position(pos.0 + DVec2::from_angle(tower.rotation) * MUZZLE_OFFSET);
        shots.push((
            *tower_id,
            Shot {
                origin: muzzle,
                target: target.id,
                target_position: target.position,
                damage: tower.damage * modifiers.damage_multiplier,
                speed: stats.projectile_speed,
                kind: stats.projectile_kind(tower.level),
                effect: stats.effect,
                color: stats.color,
            },
        ));

        if emit_cues {
            audio_events.push(AudioEvent::Shoot { sound: stats.sound });
        }
    }

    // Spawn in tower id order so projectile ids are independent of storage order.
    shots.sort_by_key(|(tower_id, _)| *tower_id);
    for (_, shot) in shots {
        world_setup::spawn_projectile(world, next_id, shot);
    }
}
