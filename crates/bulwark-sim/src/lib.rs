//! Simulation engine for Bulwark.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate,
//! and produces GameStateSnapshots for the host.

pub mod driver;
pub mod economy;
pub mod engine;
pub mod perks;
pub mod placement;
pub mod systems;
pub mod world_setup;

pub use bulwark_core as core;
pub use driver::{FixedTimestepDriver, FrameReport};
pub use engine::{ProgressReporter, SimConfig, SimulationEngine};

#[cfg(test)]
mod tests;
