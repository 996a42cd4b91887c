//! Core types and definitions for the Bulwark simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, constants, the static
//! stat tables and the wave scheduler. It has no dependency on the ECS,
//! the network relay, or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod geometry;
pub mod map;
pub mod state;
pub mod tables;
pub mod types;
pub mod waves;
