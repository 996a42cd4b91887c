//! Entity spawn factories.
//!
//! Creates enemies, towers, projectiles, perk drops and cosmetic entities
//! with the component bundles the systems query for.

use glam::DVec2;
use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::*;
use bulwark_core::constants::*;
use bulwark_core::enums::*;
use bulwark_core::map::MapDefinition;
use bulwark_core::tables::{EnemyStats, TowerStats};
use bulwark_core::types::{EntityId, Position, Velocity};

/// Hand out the next stable entity identifier.
pub fn allocate_id(next_id: &mut u32) -> EntityId {
    let id = EntityId(*next_id);
    *next_id += 1;
    id
}

/// Spawn an enemy at the map entrance with hp scaled to `wave`.
pub fn spawn_enemy(
    world: &mut World,
    next_id: &mut u32,
    map: &MapDefinition,
    kind: EnemyKind,
    wave: u32,
) -> hecs::Entity {
    let stats = EnemyStats::for_kind(kind);
    let hp = stats.scaled_hp(wave);

    let enemy = Enemy {
        kind,
        hp,
        max_hp: hp,
        speed: stats.speed,
        path_index: 1,
        distance_traveled: 0.0,
        frozen_ticks: 0,
        shock_ticks: 0,
        reward: stats.reward,
        color: stats.color.to_string(),
        radius: stats.radius,
    };

    world.spawn((
        allocate_id(next_id),
        Position(map.spawn_point()),
        enemy,
    ))
}

/// Spawn a level-1 tower with base stats at an already validated point.
pub fn spawn_tower(
    world: &mut World,
    next_id: &mut u32,
    kind: TowerKind,
    center: DVec2,
) -> EntityId {
    let stats = TowerStats::for_kind(kind);
    let id = allocate_id(next_id);

    let tower = Tower {
        kind,
        range: stats.range,
        damage: stats.damage,
        cooldown: stats.cooldown,
        last_shot_tick: None,
        rotation: 0.0,
        level: 1,
        base_cost: stats.cost,
    };

    world.spawn((id, Position(center), tower));
    id
}

/// Parameters for a projectile leaving a tower's muzzle.
#[derive(Debug, Clone)]
pub struct Shot {
    pub origin: Position,
    pub target: EntityId,
    pub target_position: Position,
    pub damage: f64,
    pub speed: f64,
    pub kind: ProjectileKind,
    pub effect: Option<StatusEffect>,
    pub color: &'static str,
}

/// Spawn a projectile aimed at the target's current position.
pub fn spawn_projectile(world: &mut World, next_id: &mut u32, shot: Shot) -> hecs::Entity {
    let velocity = Velocity::toward(&shot.origin, &shot.target_position, shot.speed);
    let projectile = Projectile {
        target: shot.target,
        damage: shot.damage,
        speed: shot.speed,
        kind: shot.kind,
        effect: shot.effect,
        color: shot.color.to_string(),
    };

    world.spawn((allocate_id(next_id), shot.origin, velocity, projectile))
}

/// Spawn a perk drop where an enemy died.
pub fn spawn_perk_drop(
    world: &mut World,
    next_id: &mut u32,
    position: Position,
    kind: PerkKind,
) -> hecs::Entity {
    world.spawn((
        allocate_id(next_id),
        position,
        PerkDrop {
            kind,
            life: PERK_DROP_LIFETIME,
        },
    ))
}

/// Spawn a burst of particles flying outward from `origin`.
///
/// Uses the cosmetic RNG so particle counts never shift gameplay rolls.
pub fn spawn_particles(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    origin: Position,
    color: &str,
    count: usize,
    max_speed: f64,
) {
    for _ in 0..count {
        let angle: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed: f64 = rng.gen_range(0.2..max_speed.max(0.3));
        let life: u32 = rng.gen_range(20..40);
        let size: f64 = rng.gen_range(1.5..4.0);

        world.spawn((
            origin,
            Velocity(DVec2::from_angle(angle) * speed),
            Particle {
                life,
                max_life: life,
                color: color.to_string(),
                size,
            },
        ));
    }
}

/// Spawn a floating text label.
pub fn spawn_floating_text(world: &mut World, position: Position, text: String, color: &str) {
    world.spawn((
        position,
        FloatingText {
            text,
            life: FLOATING_TEXT_TICKS,
            color: color.to_string(),
        },
    ));
}
