//! Cleanup system: removes dead enemies and pays out their rewards.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::components::Enemy;
use bulwark_core::constants::{DEATH_PARTICLES, PERK_DROP_CHANCE};
use bulwark_core::enums::{EnemyKind, PerkKind};
use bulwark_core::types::{EntityId, Position};

use crate::world_setup;

/// Remove every enemy with hp <= 0. Returns the total reward earned.
///
/// Deaths resolve in entity id order. Drop rolls come from `rng`, the
/// gameplay stream; particles come from `cosmetic_rng`.
pub fn run(
    world: &mut World,
    next_id: &mut u32,
    rng: &mut ChaCha8Rng,
    cosmetic_rng: &mut ChaCha8Rng,
) -> i64 {
    let mut dead: Vec<(EntityId, hecs::Entity, Position, EnemyKind, i64, String)> = world
        .query::<(&EntityId, &Position, &Enemy)>()
        .iter()
        .filter(|(_, (_, _, enemy))| enemy.hp <= 0.0)
        .map(|(entity, (id, pos, enemy))| {
            (*id, entity, *pos, enemy.kind, enemy.reward, enemy.color.clone())
        })
        .collect();

    dead.sort_by_key(|d| d.0);

    let mut total = 0;
    for (_, entity, pos, kind, reward, color) in dead {
        let _ = world.despawn(entity);
        total += reward;

        world_setup::spawn_floating_text(world, pos, format!("+${reward}"), "#fde047");
        world_setup::spawn_particles(world, cosmetic_rng, pos, &color, DEATH_PARTICLES, 2.5);

        let drops = kind == EnemyKind::Boss || rng.gen_bool(PERK_DROP_CHANCE);
        if drops {
            let perk = PerkKind::ALL[rng.gen_range(0..PerkKind::ALL.len())];
            world_setup::spawn_perk_drop(world, next_id, pos, perk);
        }
    }

    total
}
