//! Application state shared between the host and the game loop thread.

use std::fmt;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use bulwark_core::commands::PlayerCommand;
use bulwark_core::state::GameStateSnapshot;
use bulwark_sim::{ProgressReporter, SimConfig};

use crate::game_loop;

/// Commands sent from the host to the game loop thread.
#[derive(Debug)]
pub enum GameLoopCommand {
    /// A player command to forward to the simulation engine.
    PlayerCommand(PlayerCommand),
    /// Shut down the game loop thread gracefully.
    Shutdown,
}

/// Failures of the host-side handle.
#[derive(Debug)]
pub enum AppError {
    AlreadyRunning,
    NotStarted,
    /// The game loop thread has exited.
    LoopGone,
    Spawn(std::io::Error),
    Poisoned,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::AlreadyRunning => write!(f, "simulation already running"),
            AppError::NotStarted => write!(f, "simulation not started"),
            AppError::LoopGone => write!(f, "game loop thread has exited"),
            AppError::Spawn(e) => write!(f, "failed to spawn game loop thread: {e}"),
            AppError::Poisoned => write!(f, "shared state lock poisoned"),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

/// Shared application state.
///
/// - `mpsc::Sender` sits in a `Mutex` so the state is `Sync`.
/// - `latest_snapshot` is shared with the game loop thread, which replaces
///   it after every frame.
pub struct AppState {
    command_tx: Mutex<Option<mpsc::Sender<GameLoopCommand>>>,
    latest_snapshot: Arc<Mutex<Option<GameStateSnapshot>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            worker: Mutex::new(None),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.command_tx
            .lock()
            .map(|tx| tx.is_some())
            .unwrap_or(false)
    }

    /// Spawn the game loop thread with a fresh engine.
    pub fn start(
        &self,
        config: SimConfig,
        reporter: Option<Box<dyn ProgressReporter>>,
    ) -> Result<(), AppError> {
        let mut tx_lock = self.command_tx.lock().map_err(|_| AppError::Poisoned)?;
        if tx_lock.is_some() {
            return Err(AppError::AlreadyRunning);
        }

        let (tx, handle) =
            game_loop::spawn_game_loop(config, reporter, Arc::clone(&self.latest_snapshot))
                .map_err(AppError::Spawn)?;
        *tx_lock = Some(tx);
        *self.worker.lock().map_err(|_| AppError::Poisoned)? = Some(handle);
        Ok(())
    }

    /// Forward a player command to the simulation.
    pub fn send(&self, command: PlayerCommand) -> Result<(), AppError> {
        let tx_lock = self.command_tx.lock().map_err(|_| AppError::Poisoned)?;
        match tx_lock.as_ref() {
            Some(tx) => tx
                .send(GameLoopCommand::PlayerCommand(command))
                .map_err(|_| AppError::LoopGone),
            None => Err(AppError::NotStarted),
        }
    }

    /// The most recent snapshot published by the game loop.
    pub fn latest(&self) -> Option<GameStateSnapshot> {
        self.latest_snapshot.lock().ok().and_then(|s| s.clone())
    }

    /// Stop the game loop and wait for the thread to finish.
    pub fn shutdown(&self) -> Result<(), AppError> {
        let tx = self
            .command_tx
            .lock()
            .map_err(|_| AppError::Poisoned)?
            .take()
            .ok_or(AppError::NotStarted)?;
        // The loop may already be gone; joining below covers both cases.
        let _ = tx.send(GameLoopCommand::Shutdown);

        let handle = self.worker.lock().map_err(|_| AppError::Poisoned)?.take();
        if let Some(handle) = handle {
            handle.join().map_err(|_| AppError::LoopGone)?;
        }
        Ok(())
    }
}
