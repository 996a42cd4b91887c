//! Fixed-timestep driver.
//!
//! Converts wall-clock frame times into a whole number of simulation quanta so
//! the logic rate is independent of the host's frame rate. Each quantum runs
//! `game_speed` ticks; only the first of them emits per-shot audio cues.

use bulwark_core::constants::{MAX_ACCUMULATOR_MS, STEP_MS};

use crate::engine::SimulationEngine;

/// What one `advance` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Quanta consumed from the accumulator.
    pub quanta: u32,
    /// Simulation ticks executed (quanta times game speed).
    pub ticks: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FixedTimestepDriver {
    accumulator_ms: f64,
    last_frame_ms: Option<f64>,
}

impl FixedTimestepDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the frame timestamp `now_ms` and run every quantum that is due.
    /// The first call only records the timestamp.
    pub fn advance(&mut self, engine: &mut SimulationEngine, now_ms: f64) -> FrameReport {
        let elapsed = match self.last_frame_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        self.advance_by(engine, elapsed)
    }

    /// Add `elapsed_ms` of wall time and run every quantum that is due.
    pub fn advance_by(&mut self, engine: &mut SimulationEngine, elapsed_ms: f64) -> FrameReport {
        self.accumulator_ms = (self.accumulator_ms + elapsed_ms).min(MAX_ACCUMULATOR_MS);

        let mut report = FrameReport::default();
        while self.accumulator_ms >= STEP_MS {
            // Speed is re-read per quantum; a SetGameSpeed command applies from the next one.
            let speed = engine.game_speed();
            for sub in 0..speed {
                engine.step(sub == 0);
                report.ticks += 1;
            }
            report.quanta += 1;
            self.accumulator_ms -= STEP_MS;
        }
        report
    }

    /// Leftover time not yet consumed by a quantum.
    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }
}
