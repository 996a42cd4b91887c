//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world, processes player commands,
//! runs all systems, and produces `GameStateSnapshot`s. Completely headless,
//! enabling deterministic testing.

use std::collections::VecDeque;

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bulwark_core::commands::PlayerCommand;
use bulwark_core::components::{Enemy, PerkDrop, Tower};
use bulwark_core::constants::*;
use bulwark_core::enums::{AlertLevel, GamePhase, PerkKind, Theme, TowerKind};
use bulwark_core::error::ActionError;
use bulwark_core::events::{Alert, AudioEvent, Haptic};
use bulwark_core::map::MapDefinition;
use bulwark_core::state::GameStateSnapshot;
use bulwark_core::types::{EntityId, Position, SimTime};
use bulwark_core::waves::{build_spawn_queue, is_boss_wave, SpawnEntry, WaveData};

use crate::economy::{CountdownStep, GameState};
use crate::perks::PerkState;
use crate::placement;
use crate::systems;
use crate::systems::snapshot::Feedback;
use crate::systems::wave_spawner::SpawnStep;
use crate::world_setup;

/// Mixed into the seed to derive the cosmetic RNG stream.
const COSMETIC_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub theme: Theme,
    pub starting_money: i64,
    pub starting_lives: i32,
    /// Initial game speed (1 or 2).
    pub game_speed: u32,
    /// Arm the auto-start countdown after each cleared wave.
    /// Multiplayer clients turn this off and wait for the relay.
    pub auto_start: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            theme: Theme::default(),
            starting_money: STARTING_MONEY,
            starting_lives: STARTING_LIVES,
            game_speed: 1,
            auto_start: true,
        }
    }
}

/// Receives the final wave reached when a game ends.
pub trait ProgressReporter: Send {
    fn report_final_wave(&mut self, wave: u32);
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    config: SimConfig,
    world: World,
    map: MapDefinition,
    state: GameState,
    perks: PerkState,
    spawn_queue: VecDeque<SpawnEntry>,
    rng: ChaCha8Rng,
    cosmetic_rng: ChaCha8Rng,
    next_id: u32,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<hecs::Entity>,
    audio_events: Vec<AudioEvent>,
    haptics: Vec<Haptic>,
    alerts: Vec<Alert>,
    reporter: Option<Box<dyn ProgressReporter>>,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let speed = if GAME_SPEEDS.contains(&config.game_speed) {
            config.game_speed
        } else {
            1
        };

        Self {
            world: World::new(),
            map: MapDefinition::for_theme(config.theme),
            state: GameState::new(config.starting_money, config.starting_lives, speed),
            perks: PerkState::default(),
            spawn_queue: VecDeque::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            cosmetic_rng: ChaCha8Rng::seed_from_u64(config.seed ^ COSMETIC_SEED_MIX),
            next_id: 0,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            audio_events: Vec::new(),
            haptics: Vec::new(),
            alerts: Vec::new(),
            reporter: None,
            config,
        }
    }

    /// Install the collaborator that is told the final wave on game over.
    pub fn set_progress_reporter(&mut self, reporter: Box<dyn ProgressReporter>) {
        self.reporter = Some(reporter);
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.step(true);
        self.snapshot()
    }

    /// Advance the simulation by one tick.
    ///
    /// `emit_cues` is false for the extra sub-steps of a fast-forwarded
    /// quantum, which suppresses the per-shot and per-hit audio cues.
    pub fn step(&mut self, emit_cues: bool) {
        self.process_commands();

        if self.state.is_game_over {
            return;
        }

        let now = self.state.time.tick;
        self.perks.sweep(now);

        if !self.state.is_playing {
            self.run_countdown();
        }

        if self.state.is_playing {
            self.run_wave(emit_cues);
        } else {
            self.run_between_waves(emit_cues);
        }
    }

    /// Build a snapshot of the current state, draining this frame's feedback.
    pub fn snapshot(&mut self) -> GameStateSnapshot {
        let feedback = Feedback {
            audio_events: std::mem::take(&mut self.audio_events),
            haptics: std::mem::take(&mut self.haptics),
            alerts: std::mem::take(&mut self.alerts),
        };
        systems::snapshot::build_snapshot(
            &self.world,
            &self.state,
            &self.perks,
            &self.map,
            self.spawn_queue.len(),
            feedback,
        )
    }

    // --- Player actions ---

    /// Start the current wave from the local scheduler.
    pub fn start_wave(&mut self) -> Result<u32, ActionError> {
        let result = self.state.begin_wave();
        let wave = self.note("start_wave", result)?;
        self.spawn_queue = build_spawn_queue(wave);
        self.announce_wave(wave);
        Ok(wave)
    }

    /// Start a wave with a schedule received from the relay.
    ///
    /// Reseeds the gameplay RNG with `config.seed ^ wave_data.seed`.
    pub fn start_synced_wave(&mut self, wave_data: WaveData) -> Result<u32, ActionError> {
        let result = self.check_can_start();
        self.note("start_synced_wave", result)?;

        self.state.wave = wave_data.wave;
        let result = self.state.begin_wave();
        let wave = self.note("start_synced_wave", result)?;
        self.spawn_queue = wave_data.enemies.into_iter().collect();
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ wave_data.seed);
        self.announce_wave(wave);
        Ok(wave)
    }

    /// Validate a placement without committing it. Never emits a cue.
    pub fn preview_placement(&self, kind: TowerKind, point: DVec2) -> Result<DVec2, ActionError> {
        self.state.ensure_running()?;
        placement::check_placement(&self.world, &self.map, self.state.money, kind, point)
    }

    /// Place a level-1 tower at the grid cell containing `point`.
    pub fn place_tower(&mut self, kind: TowerKind, point: DVec2) -> Result<EntityId, ActionError> {
        let result = self.preview_placement(kind, point);
        let center = self.note("place_tower", result)?;

        let cost = bulwark_core::tables::TowerStats::for_kind(kind).cost;
        let result = self.state.spend(cost);
        self.note("place_tower", result)?;

        let id = world_setup::spawn_tower(&mut self.world, &mut self.next_id, kind, center);
        self.audio_events.push(AudioEvent::Build);
        self.haptics.push(Haptic::Light);
        debug!(?kind, x = center.x, y = center.y, cost, "tower placed");
        Ok(id)
    }

    /// Raise a tower one level. Returns the new level.
    pub fn upgrade_tower(&mut self, tower_id: EntityId) -> Result<u8, ActionError> {
        let result = self.try_upgrade(tower_id);
        self.note("upgrade_tower", result)
    }

    /// Sell a tower. Returns the refund.
    pub fn sell_tower(&mut self, tower_id: EntityId) -> Result<i64, ActionError> {
        let result = self.try_sell(tower_id);
        self.note("sell_tower", result)
    }

    /// Collect every perk drop within pickup radius of `point`.
    /// Returns how many were collected; zero is not a rejection.
    pub fn pickup_drops(&mut self, point: DVec2) -> Result<usize, ActionError> {
        let result = self.state.ensure_running();
        self.note("pickup_drop", result)?;

        let picked: Vec<(hecs::Entity, PerkKind)> = self
            .world
            .query::<(&Position, &PerkDrop)>()
            .iter()
            .filter(|(_, (pos, _))| pos.0.distance(point) <= PICKUP_RADIUS)
            .map(|(entity, (_, drop))| (entity, drop.kind))
            .collect();

        for (entity, kind) in &picked {
            let _ = self.world.despawn(*entity);
            self.perks.add(*kind);
            self.audio_events.push(AudioEvent::PerkPickup);
            self.haptics.push(Haptic::Light);
        }
        Ok(picked.len())
    }

    /// Consume one unit of `kind` from the inventory and apply it.
    pub fn activate_perk(&mut self, kind: PerkKind) -> Result<(), ActionError> {
        let result = self.state.ensure_running().and_then(|_| self.perks.take(kind));
        self.note("activate_perk", result)?;

        match kind {
            PerkKind::Money => self.state.earn(MONEY_PERK_AMOUNT),
            PerkKind::Freeze => {
                for (_, enemy) in self.world.query_mut::<&mut Enemy>() {
                    enemy.frozen_ticks = FREEZE_PERK_TICKS;
                }
            }
            PerkKind::Damage | PerkKind::Speed => {
                self.perks.install(kind, self.state.time.tick);
            }
        }

        self.audio_events.push(AudioEvent::PerkActivate { kind });
        self.haptics.push(Haptic::Medium);
        info!(?kind, tick = self.state.time.tick, "perk activated");
        Ok(())
    }

    pub fn set_game_speed(&mut self, speed: u32) -> Result<(), ActionError> {
        let result = self
            .state
            .ensure_running()
            .and_then(|_| self.state.set_game_speed(speed));
        self.note("set_game_speed", result)
    }

    /// Discard the current game and rebuild everything from the config.
    /// Commands still queued behind the reset are kept.
    pub fn reset(&mut self) {
        let reporter = self.reporter.take();
        let pending = std::mem::take(&mut self.command_queue);
        *self = Self::new(self.config.clone());
        self.reporter = reporter;
        self.command_queue = pending;
        info!(seed = self.config.seed, "simulation reset");
    }

    // --- Accessors ---

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.state.time
    }

    pub fn game_speed(&self) -> u32 {
        self.state.game_speed
    }

    pub fn perks(&self) -> &PerkState {
        &self.perks
    }

    pub fn map(&self) -> &MapDefinition {
        &self.map
    }

    /// Spawns still waiting in the current wave.
    pub fn spawn_queue(&self) -> &VecDeque<SpawnEntry> {
        &self.spawn_queue
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn enemy_count(&self) -> usize {
        self.world.query::<&Enemy>().iter().count()
    }

    // --- Test hooks ---

    /// Spawn an enemy of `kind` at `position` with a given path progress.
    #[cfg(test)]
    pub fn spawn_test_enemy(
        &mut self,
        kind: bulwark_core::enums::EnemyKind,
        position: DVec2,
        distance_traveled: f64,
    ) -> EntityId {
        let entity = world_setup::spawn_enemy(
            &mut self.world,
            &mut self.next_id,
            &self.map,
            kind,
            self.state.wave,
        );
        let mut pos = self.world.get::<&mut Position>(entity).unwrap();
        pos.0 = position;
        drop(pos);
        let mut enemy = self.world.get::<&mut Enemy>(entity).unwrap();
        enemy.distance_traveled = distance_traveled;
        drop(enemy);
        *self.world.get::<&EntityId>(entity).unwrap()
    }

    /// Place a tower without placement checks or payment.
    #[cfg(test)]
    pub fn spawn_test_tower(&mut self, kind: TowerKind, position: DVec2) -> EntityId {
        world_setup::spawn_tower(&mut self.world, &mut self.next_id, kind, position)
    }

    #[cfg(test)]
    pub fn spawn_test_drop(&mut self, kind: PerkKind, position: DVec2) {
        world_setup::spawn_perk_drop(&mut self.world, &mut self.next_id, Position(position), kind);
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[cfg(test)]
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    #[cfg(test)]
    pub fn grant_perk(&mut self, kind: PerkKind) {
        self.perks.add(kind);
    }

    // --- Tick phases ---

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command. Rejections are already logged and cued.
    fn handle_command(&mut self, command: PlayerCommand) {
        let _ = match command {
            PlayerCommand::StartWave => self.start_wave().map(drop),
            PlayerCommand::StartSyncedWave { wave_data } => {
                self.start_synced_wave(wave_data).map(drop)
            }
            PlayerCommand::PlaceTower { kind, x, y } => {
                self.place_tower(kind, DVec2::new(x, y)).map(drop)
            }
            PlayerCommand::UpgradeTower { tower_id } => self.upgrade_tower(tower_id).map(drop),
            PlayerCommand::SellTower { tower_id } => self.sell_tower(tower_id).map(drop),
            PlayerCommand::PickupDrop { x, y } => self.pickup_drops(DVec2::new(x, y)).map(drop),
            PlayerCommand::ActivatePerk { kind } => self.activate_perk(kind),
            PlayerCommand::SetGameSpeed { speed } => self.set_game_speed(speed),
            PlayerCommand::Reset => {
                self.reset();
                Ok(())
            }
        };
    }

    /// Beeps are one-off cues, so they fire on whichever sub-step crosses a threshold.
    fn run_countdown(&mut self) {
        match self.state.tick_countdown() {
            CountdownStep::Beep => self.audio_events.push(AudioEvent::Tick),
            CountdownStep::Expired => {
                let _ = self.start_wave();
            }
            CountdownStep::Running | CountdownStep::Inactive => {}
        }
    }

    /// One tick of an active wave.
    fn run_wave(&mut self, emit_cues: bool) {
        let step = systems::wave_spawner::run(
            &mut self.world,
            &mut self.next_id,
            &mut self.spawn_queue,
            &self.map,
            self.state.wave,
        );

        if step == SpawnStep::Drained && self.enemy_count() == 0 && self.state.lives > 0 {
            self.finish_wave();
            systems::effects::run(&mut self.world, &mut self.despawn_buffer);
            self.state.time.advance();
            return;
        }

        let leaked = systems::movement::run(&mut self.world, &self.map, &mut self.despawn_buffer);
        for _ in 0..leaked {
            self.audio_events.push(AudioEvent::Alarm);
            self.haptics.push(Haptic::Heavy);
            if self.state.lose_life() {
                self.end_game();
            }
        }
        if self.state.is_game_over {
            return;
        }

        self.run_combat(emit_cues);
        systems::effects::run(&mut self.world, &mut self.despawn_buffer);
        self.state.time.advance();
    }

    /// One tick while no wave is running. Projectiles still in the air
    /// finish their flight and cosmetics keep aging.
    fn run_between_waves(&mut self, emit_cues: bool) {
        systems::projectiles::run(
            &mut self.world,
            &self.map,
            &mut self.cosmetic_rng,
            emit_cues,
            &mut self.audio_events,
            &mut self.despawn_buffer,
        );
        let reward =
            systems::cleanup::run(&mut self.world, &mut self.next_id, &mut self.rng, &mut self.cosmetic_rng);
        self.state.earn(reward);
        systems::effects::run(&mut self.world, &mut self.despawn_buffer);
        self.state.time.advance();
    }

    fn run_combat(&mut self, emit_cues: bool) {
        systems::fire_control::run(
            &mut self.world,
            &mut self.next_id,
            self.perks.modifiers(),
            self.state.time.tick,
            emit_cues,
            &mut self.audio_events,
        );
        systems::projectiles::run(
            &mut self.world,
            &self.map,
            &mut self.cosmetic_rng,
            emit_cues,
            &mut self.audio_events,
            &mut self.despawn_buffer,
        );
        let reward =
            systems::cleanup::run(&mut self.world, &mut self.next_id, &mut self.rng, &mut self.cosmetic_rng);
        self.state.earn(reward);
    }

    // --- Helpers ---

    fn check_can_start(&self) -> Result<(), ActionError> {
        self.state.ensure_running()?;
        if self.state.is_playing {
            return Err(ActionError::WaveInProgress);
        }
        Ok(())
    }

    fn try_upgrade(&mut self, tower_id: EntityId) -> Result<u8, ActionError> {
        self.state.ensure_running()?;
        let entity = placement::find_tower(&self.world, tower_id)?;
        let mut tower = self
            .world
            .get::<&mut Tower>(entity)
            .map_err(|_| ActionError::UnknownTower { id: tower_id })?;

        let cost = placement::quote_upgrade(&tower)?;
        self.state.spend(cost)?;
        placement::apply_upgrade(&mut tower);
        let level = tower.level;
        drop(tower);

        self.audio_events.push(AudioEvent::Build);
        self.haptics.push(Haptic::Light);
        debug!(id = tower_id.0, level, cost, "tower upgraded");
        Ok(level)
    }

    fn try_sell(&mut self, tower_id: EntityId) -> Result<i64, ActionError> {
        self.state.ensure_running()?;
        let entity = placement::find_tower(&self.world, tower_id)?;
        let (refund, position) = {
            let tower = self
                .world
                .get::<&Tower>(entity)
                .map_err(|_| ActionError::UnknownTower { id: tower_id })?;
            let position = self
                .world
                .get::<&Position>(entity)
                .map(|p| *p)
                .unwrap_or_default();
            (placement::quote_sale(&tower), position)
        };

        let _ = self.world.despawn(entity);
        self.state.earn(refund);
        world_setup::spawn_floating_text(&mut self.world, position, format!("+${refund}"), "#fde047");
        debug!(id = tower_id.0, refund, "tower sold");
        Ok(refund)
    }

    /// Log and cue a rejected action, passing the result through.
    fn note<T>(&mut self, action: &'static str, result: Result<T, ActionError>) -> Result<T, ActionError> {
        if let Err(err) = &result {
            debug!(action, %err, "action rejected");
            self.audio_events.push(AudioEvent::Reject);
        }
        result
    }

    fn announce_wave(&mut self, wave: u32) {
        let boss = is_boss_wave(wave);
        self.audio_events.push(AudioEvent::WaveStart { boss });
        if boss {
            self.haptics.push(Haptic::Heavy);
            self.alerts.push(Alert {
                level: AlertLevel::Critical,
                message: "BOSS INCOMING".to_string(),
                tick: self.state.time.tick,
            });
        } else {
            self.haptics.push(Haptic::Medium);
        }
        info!(wave, boss, spawns = self.spawn_queue.len(), "wave started");
    }

    fn finish_wave(&mut self) {
        let cleared = self.state.wave;
        let bonus = self.state.clear_wave(self.config.auto_start);
        self.audio_events.push(AudioEvent::WaveClear);
        self.alerts.push(Alert {
            level: AlertLevel::Info,
            message: format!("Wave {cleared} cleared (+${bonus})"),
            tick: self.state.time.tick,
        });
        info!(wave = cleared, bonus, money = self.state.money, "wave cleared");
    }

    fn end_game(&mut self) {
        let wave = self.state.wave;
        self.spawn_queue.clear();
        self.audio_events.push(AudioEvent::GameOver { wave });
        self.haptics.push(Haptic::Heavy);
        self.alerts.push(Alert {
            level: AlertLevel::Critical,
            message: format!("Base overrun on wave {wave}"),
            tick: self.state.time.tick,
        });
        info!(wave, tick = self.state.time.tick, "game over");
        if let Some(reporter) = self.reporter.as_mut() {
            reporter.report_final_wave(wave);
        }
    }
}
