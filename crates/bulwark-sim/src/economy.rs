//! Economy and progression state machine.
//!
//! `GameState` is the authoritative progression record: money, lives, wave
//! counter, the auto-start countdown and the terminal game-over flag.
//! Transactions that cannot be afforded are rejected, never clamped.

use serde::{Deserialize, Serialize};

use bulwark_core::constants::*;
use bulwark_core::enums::GamePhase;
use bulwark_core::error::ActionError;
use bulwark_core::types::SimTime;

/// Progression record owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub money: i64,
    pub lives: i32,
    /// Current wave number, starting at 1. Advances only on a full clear.
    pub wave: u32,
    pub is_playing: bool,
    pub is_game_over: bool,
    /// Logical clock.
    pub time: SimTime,
    /// Ticks until the next wave starts on its own; -1 when inactive.
    pub auto_start_timer: i32,
    /// Simulation ticks per real quantum (1 or 2).
    pub game_speed: u32,
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// No countdown armed.
    Inactive,
    Running,
    /// Countdown crossed one of the beep thresholds.
    Beep,
    /// Countdown hit zero; the next wave should start now.
    Expired,
}

impl GameState {
    pub fn new(starting_money: i64, starting_lives: i32, game_speed: u32) -> Self {
        Self {
            money: starting_money,
            lives: starting_lives,
            wave: 1,
            is_playing: false,
            is_game_over: false,
            time: SimTime::default(),
            auto_start_timer: -1,
            game_speed,
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.is_game_over {
            GamePhase::GameOver
        } else if self.is_playing {
            GamePhase::Playing
        } else if self.auto_start_timer > 0 {
            GamePhase::Countdown
        } else {
            GamePhase::Idle
        }
    }

    /// Deduct `amount`, or reject without touching the balance.
    pub fn spend(&mut self, amount: i64) -> Result<(), ActionError> {
        self.can_afford(amount)?;
        self.money -= amount;
        Ok(())
    }

    pub fn can_afford(&self, amount: i64) -> Result<(), ActionError> {
        if self.money < amount {
            return Err(ActionError::InsufficientFunds {
                needed: amount,
                available: self.money,
            });
        }
        Ok(())
    }

    pub fn earn(&mut self, amount: i64) {
        self.money += amount;
    }

    /// Reject any action once the game has ended.
    pub fn ensure_running(&self) -> Result<(), ActionError> {
        if self.is_game_over {
            return Err(ActionError::GameOver);
        }
        Ok(())
    }

    /// Enter the playing state for the current wave, cancelling any countdown.
    pub fn begin_wave(&mut self) -> Result<u32, ActionError> {
        self.ensure_running()?;
        if self.is_playing {
            return Err(ActionError::WaveInProgress);
        }
        self.auto_start_timer = -1;
        self.is_playing = true;
        Ok(self.wave)
    }

    /// Close out a fully cleared wave. Returns the bonus granted.
    ///
    /// The bonus is computed from the wave that was just cleared.
    pub fn clear_wave(&mut self, arm_countdown: bool) -> i64 {
        let bonus = WAVE_CLEAR_BASE_BONUS + self.wave as i64 * WAVE_CLEAR_BONUS_PER_WAVE;
        self.is_playing = false;
        self.wave += 1;
        self.money += bonus;
        self.auto_start_timer = if arm_countdown { AUTO_START_TICKS } else { -1 };
        bonus
    }

    /// Remove one life for a leaked enemy. Returns true if this ended the game.
    pub fn lose_life(&mut self) -> bool {
        if self.is_game_over {
            return false;
        }
        self.lives -= 1;
        if self.lives <= 0 {
            self.is_game_over = true;
            self.is_playing = false;
            self.auto_start_timer = -1;
            return true;
        }
        false
    }

    /// Advance the auto-start countdown by one tick. Only meaningful while not playing.
    pub fn tick_countdown(&mut self) -> CountdownStep {
        if self.is_playing || self.is_game_over || self.auto_start_timer <= 0 {
            return CountdownStep::Inactive;
        }
        self.auto_start_timer -= 1;
        if self.auto_start_timer == 0 {
            CountdownStep::Expired
        } else if COUNTDOWN_BEEP_TICKS.contains(&self.auto_start_timer) {
            CountdownStep::Beep
        } else {
            CountdownStep::Running
        }
    }

    pub fn set_game_speed(&mut self, speed: u32) -> Result<(), ActionError> {
        if !GAME_SPEEDS.contains(&speed) {
            return Err(ActionError::InvalidSpeed { speed });
        }
        self.game_speed = speed;
        Ok(())
    }
}
