//! Spawn draining: releases queued enemies one per due tick.

use std::collections::VecDeque;

use hecs::World;

use bulwark_core::map::MapDefinition;
use bulwark_core::waves::SpawnEntry;

/// What the spawn step did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnStep {
    /// The queue head was due and an enemy entered the field.
    Spawned,
    /// The queue head is not due yet; its delay was decremented.
    Waiting,
    /// Nothing left to spawn this wave.
    Drained,
}

/// Drain at most one queue entry.
pub fn run(
    world: &mut World,
    next_id: &mut u32,
    queue: &mut VecDeque<SpawnEntry>,
    map: &MapDefinition,
    wave: u32,
) -> SpawnStep {
    let Some(head) = queue.front_mut() else {
        return SpawnStep::Drained;
    };

    if head.delay > 0 {
        head.delay -= 1;
        return SpawnStep::Waiting;
    }

    let kind = head.kind;
    queue.pop_front();
    crate::world_setup::spawn_enemy(world, next_id, map, kind, wave);
    SpawnStep::Spawned
}
