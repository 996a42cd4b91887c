//! Cosmetic entity aging and perk drop expiry.

use hecs::{Entity, World};

use bulwark_core::components::{FloatingText, Particle, PerkDrop};
use bulwark_core::constants::{FLOATING_TEXT_RISE, PARTICLE_FRICTION};
use bulwark_core::types::{Position, Velocity};

/// Age particles, floating texts and perk drops by one tick.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (pos, vel, particle)) in
        world.query_mut::<(&mut Position, &mut Velocity, &mut Particle)>()
    {
        pos.0 += vel.0;
        vel.0 *= PARTICLE_FRICTION;
        particle.life = particle.life.saturating_sub(1);
        if particle.life == 0 {
            despawn_buffer.push(entity);
        }
    }

    for (entity, (pos, text)) in world.query_mut::<(&mut Position, &mut FloatingText)>() {
        pos.0.y -= FLOATING_TEXT_RISE;
        text.life = text.life.saturating_sub(1);
        if text.life == 0 {
            despawn_buffer.push(entity);
        }
    }

    for (entity, drop) in world.query_mut::<&mut PerkDrop>() {
        drop.life = drop.life.saturating_sub(1);
        if drop.life == 0 {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
