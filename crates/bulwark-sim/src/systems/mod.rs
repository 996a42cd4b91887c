//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are plain functions that take `&mut World` (or `&World` for read-only).
//! They do not own state: entity state lives in components, progression
//! state in the engine. The engine calls them in a fixed order.

pub mod cleanup;
pub mod effects;
pub mod fire_control;
pub mod movement;
pub mod projectiles;
pub mod snapshot;
pub mod wave_spawner;
