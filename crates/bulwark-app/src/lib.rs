//! Headless host for the Bulwark simulation.
//!
//! Runs the engine on its own thread, paces it off the wall clock and records
//! finished runs to a high score file.

pub mod autopilot;
pub mod game_loop;
pub mod highscores;
pub mod state;

pub use bulwark_core as core;
