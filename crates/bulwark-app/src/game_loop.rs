//! Game loop thread: paces the simulation off the wall clock and publishes snapshots.
//!
//! The engine is created inside this thread so it never crosses a thread
//! boundary. Commands arrive via `mpsc` channel; snapshots are stored in shared
//! state for polling.

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use bulwark_core::state::GameStateSnapshot;
use bulwark_sim::{FixedTimestepDriver, ProgressReporter, SimConfig, SimulationEngine};

use crate::state::GameLoopCommand;

/// Host frame interval. The driver decides how many ticks each frame is worth.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Spawns the game loop in a new thread.
///
/// Returns the command sender and the thread handle.
pub fn spawn_game_loop(
    config: SimConfig,
    reporter: Option<Box<dyn ProgressReporter>>,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
) -> io::Result<(mpsc::Sender<GameLoopCommand>, JoinHandle<()>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<GameLoopCommand>();

    let handle = std::thread::Builder::new()
        .name("bulwark-game-loop".into())
        .spawn(move || {
            let mut engine = SimulationEngine::new(config);
            if let Some(reporter) = reporter {
                engine.set_progress_reporter(reporter);
            }
            run_game_loop(&mut engine, cmd_rx, &latest_snapshot);
        })?;

    Ok((cmd_tx, handle))
}

/// The game loop. Runs until Shutdown command or channel disconnect.
fn run_game_loop(
    engine: &mut SimulationEngine,
    cmd_rx: mpsc::Receiver<GameLoopCommand>,
    latest_snapshot: &Mutex<Option<GameStateSnapshot>>,
) {
    let mut driver = FixedTimestepDriver::new();
    let started = Instant::now();

    // Publish the initial state so pollers never see `None` once started.
    publish(latest_snapshot, engine.snapshot());

    loop {
        if !drain_commands(engine, &cmd_rx) {
            debug!(tick = engine.time().tick, "game loop stopping");
            return;
        }

        let now_ms = started.elapsed().as_secs_f64() * 1000.0;
        let report = driver.advance(engine, now_ms);
        if report.ticks > 0 {
            publish(latest_snapshot, engine.snapshot());
        }

        std::thread::sleep(FRAME_INTERVAL);
    }
}

/// Queue every pending command. Returns false when the loop should stop.
fn drain_commands(engine: &mut SimulationEngine, cmd_rx: &mpsc::Receiver<GameLoopCommand>) -> bool {
    loop {
        match cmd_rx.try_recv() {
            Ok(GameLoopCommand::PlayerCommand(cmd)) => engine.queue_command(cmd),
            Ok(GameLoopCommand::Shutdown) => return false,
            Err(mpsc::TryRecvError::Empty) => return true,
            Err(mpsc::TryRecvError::Disconnected) => return false,
        }
    }
}

fn publish(latest_snapshot: &Mutex<Option<GameStateSnapshot>>, snapshot: GameStateSnapshot) {
    if let Ok(mut lock) = latest_snapshot.lock() {
        *lock = Some(snapshot);
    }
}
