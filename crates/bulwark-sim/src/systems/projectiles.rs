//! Projectile flight and hit resolution.
//!
//! Projectiles home on their target's current position every tick. A
//! projectile whose target is gone keeps its last velocity and is removed
//! once it leaves the playfield; it never picks a new target.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::{Enemy, Projectile};
use bulwark_core::constants::*;
use bulwark_core::enums::{ProjectileKind, StatusEffect};
use bulwark_core::events::AudioEvent;
use bulwark_core::map::MapDefinition;
use bulwark_core::types::{EntityId, Position, Velocity};

use crate::world_setup;

/// A projectile that reached its target this tick.
#[derive(Debug, Clone)]
struct Hit {
    projectile: EntityId,
    target: EntityId,
    impact: Position,
    damage: f64,
    kind: ProjectileKind,
    effect: Option<StatusEffect>,
    color: String,
}

/// Apply a status effect to one enemy. Durations are set, not stacked.
pub fn apply_effect(enemy: &mut Enemy, effect: Option<StatusEffect>) {
    match effect {
        Some(StatusEffect::Freeze) => enemy.frozen_ticks = FREEZE_HIT_TICKS,
        Some(StatusEffect::Shock) => enemy.shock_ticks = SHOCK_MARK_TICKS,
        None => {}
    }
}

/// Move every projectile one tick and resolve the hits.
pub fn run(
    world: &mut World,
    map: &MapDefinition,
    cosmetic_rng: &mut ChaCha8Rng,
    emit_cues: bool,
    audio_events: &mut Vec<AudioEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    let targets: HashMap<EntityId, (Entity, Position)> = world
        .query::<(&EntityId, &Position, &Enemy)>()
        .iter()
        .map(|(entity, (id, pos, _))| (*id, (entity, *pos)))
        .collect();

    let mut hits: Vec<Hit> = Vec::new();

    for (entity, (id, pos, vel, projectile)) in
        world.query_mut::<(&EntityId, &mut Position, &mut Velocity, &Projectile)>()
    {
        let Some((_, target_pos)) = targets.get(&projectile.target) else {
            pos.0 += vel.0;
            if !map.contains(pos.0) {
                despawn_buffer.push(entity);
            }
            continue;
        };

        let distance = pos.distance_to(target_pos);
        *vel = Velocity::toward(pos, target_pos, projectile.speed);

        if distance <= projectile.speed {
            hits.push(Hit {
                projectile: *id,
                target: projectile.target,
                impact: *target_pos,
                damage: projectile.damage,
                kind: projectile.kind,
                effect: projectile.effect,
                color: projectile.color.clone(),
            });
            despawn_buffer.push(entity);
        } else {
            pos.0 += vel.0;
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    hits.sort_by_key(|h| h.projectile);
    for hit in hits {
        match hit.kind {
            ProjectileKind::Area { blast_radius } => {
                for (_, (pos, enemy)) in world.query_mut::<(&Position, &mut Enemy)>() {
                    if hit.impact.distance_to(pos) <= blast_radius {
                        enemy.hp -= hit.damage;
                        apply_effect(enemy, hit.effect);
                    }
                }
                world_setup::spawn_particles(
                    world,
                    cosmetic_rng,
                    hit.impact,
                    &hit.color,
                    EXPLOSION_PARTICLES,
                    3.5,
                );
                if emit_cues {
                    audio_events.push(AudioEvent::Explosion);
                }
            }
            ProjectileKind::Single => {
                if let Some((target_entity, _)) = targets.get(&hit.target) {
                    if let Ok(mut enemy) = world.get::<&mut Enemy>(*target_entity) {
                        enemy.hp -= hit.damage;
                        apply_effect(&mut enemy, hit.effect);
                    }
                }
                world_setup::spawn_particles(
                    world,
                    cosmetic_rng,
                    hit.impact,
                    &hit.color,
                    IMPACT_PARTICLES,
                    2.0,
                );
                if emit_cues {
                    audio_events.push(AudioEvent::Impact);
                }
            }
        }
    }
}
