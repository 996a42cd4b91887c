//! Enemy waypoint traversal and leak detection.
//!
//! Each enemy walks toward `waypoints[path_index]`. An enemy whose index has
//! run past the last waypoint has reached the base and is removed here; the
//! engine charges the life.

use hecs::{Entity, World};

use bulwark_core::components::Enemy;
use bulwark_core::constants::FROZEN_SPEED_FACTOR;
use bulwark_core::map::MapDefinition;
use bulwark_core::types::Position;

/// Move every enemy one tick. Returns the number of enemies that leaked.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, map: &MapDefinition, despawn_buffer: &mut Vec<Entity>) -> u32 {
    despawn_buffer.clear();

    for (entity, (pos, enemy)) in world.query_mut::<(&mut Position, &mut Enemy)>() {
        if enemy.shock_ticks > 0 {
            enemy.shock_ticks -= 1;
        }

        let Some(&target) = map.waypoints.get(enemy.path_index) else {
            despawn_buffer.push(entity);
            continue;
        };

        let speed = if enemy.frozen_ticks > 0 {
            enemy.frozen_ticks -= 1;
            enemy.speed * FROZEN_SPEED_FACTOR
        } else {
            enemy.speed
        };

        let to_target = target - pos.0;
        let distance = to_target.length();
        if distance <= speed {
            pos.0 = target;
            enemy.path_index += 1;
            enemy.distance_traveled += distance;
        } else {
            pos.0 += to_target / distance * speed;
            enemy.distance_traveled += speed;
        }
    }

    let leaked = despawn_buffer.len() as u32;
    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
    leaked
}
