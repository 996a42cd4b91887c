//! Tests for the simulation engine, combat systems, economy and perks.

use std::sync::{Arc, Mutex};

use glam::DVec2;
use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bulwark_core::commands::PlayerCommand;
use bulwark_core::components::{Enemy, FloatingText, PerkDrop, Projectile, Tower};
use bulwark_core::constants::*;
use bulwark_core::enums::*;
use bulwark_core::error::ActionError;
use bulwark_core::events::AudioEvent;
use bulwark_core::map::MapDefinition;
use bulwark_core::state::GameStateSnapshot;
use bulwark_core::types::{EntityId, Position, Velocity};
use bulwark_core::waves::{SpawnEntry, WaveData};

use crate::driver::FixedTimestepDriver;
use crate::engine::{ProgressReporter, SimConfig, SimulationEngine};
use crate::systems::{movement, projectiles};
use crate::world_setup;

// ---- Helpers ----

/// Engine with a wave marked in progress and an empty spawn queue, so
/// combat systems run without the scheduler adding enemies.
fn playing_engine(config: SimConfig) -> SimulationEngine {
    let mut engine = SimulationEngine::new(config);
    engine.state_mut().is_playing = true;
    engine
}

fn count_cues(snap: &GameStateSnapshot, pred: impl Fn(&AudioEvent) -> bool) -> usize {
    snap.audio_events.iter().filter(|e| pred(e)).count()
}

fn entity_of(engine: &SimulationEngine, id: EntityId) -> hecs::Entity {
    engine
        .world()
        .query::<&EntityId>()
        .iter()
        .find(|(_, eid)| **eid == id)
        .map(|(entity, _)| entity)
        .expect("entity with id")
}

struct Recorder(Arc<Mutex<Vec<u32>>>);

impl ProgressReporter for Recorder {
    fn report_final_wave(&mut self, wave: u32) {
        self.0.lock().unwrap().push(wave);
    }
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });

    let opening = [
        PlayerCommand::PlaceTower {
            kind: TowerKind::Basic,
            x: 100.0,
            y: 140.0,
        },
        PlayerCommand::PlaceTower {
            kind: TowerKind::Frost,
            x: 260.0,
            y: 220.0,
        },
        PlayerCommand::StartWave,
    ];
    engine_a.queue_commands(opening.clone());
    engine_b.queue_commands(opening);

    for _ in 0..2000 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();

        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_idle_engine_advances_time_only() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    for _ in 0..100 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, 100);
    assert_eq!(engine.phase(), GamePhase::Idle);
    assert_eq!(engine.state().money, STARTING_MONEY);
    assert_eq!(engine.enemy_count(), 0);
}

// ---- Spawning ----

#[test]
fn test_wave_one_spawns_scaled_enemies() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    assert_eq!(engine.start_wave(), Ok(1));
    assert_eq!(engine.spawn_queue().len(), 6);

    let snap = engine.tick();
    assert_eq!(snap.enemies.len(), 1);
    assert_eq!(snap.progress.pending_spawns, 5);
    let enemy = &snap.enemies[0];
    assert_eq!(enemy.kind, EnemyKind::Normal);
    assert!((enemy.hp - 40.5).abs() < 1e-9);
    assert_eq!(enemy.hp, enemy.max_hp);

    // Next head has delay 30: thirty quiet ticks, then the spawn.
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(engine.enemy_count(), 1);
    engine.tick();
    assert_eq!(engine.enemy_count(), 2);
}

#[test]
fn test_start_wave_rejected_while_playing() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start_wave().unwrap();
    assert_eq!(engine.start_wave(), Err(ActionError::WaveInProgress));
    let snap = engine.snapshot();
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::Reject), 1);
}

#[test]
fn test_boss_wave_raises_alert() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.state_mut().wave = 5;
    engine.start_wave().unwrap();

    let snap = engine.snapshot();
    assert!(snap
        .audio_events
        .contains(&AudioEvent::WaveStart { boss: true }));
    assert!(snap
        .alerts
        .iter()
        .any(|a| a.level == AlertLevel::Critical && a.message == "BOSS INCOMING"));
    assert_eq!(engine.spawn_queue().back().map(|e| e.kind), Some(EnemyKind::Boss));
}

#[test]
fn test_synced_wave_replaces_queue() {
    let mut engine = SimulationEngine::new(SimConfig {
        auto_start: false,
        ..Default::default()
    });
    let data = WaveData {
        wave: 3,
        enemies: vec![
            SpawnEntry {
                kind: EnemyKind::Tank,
                delay: 0,
            },
            SpawnEntry {
                kind: EnemyKind::Fast,
                delay: 10,
            },
        ],
        seed: 77,
    };

    assert_eq!(engine.start_synced_wave(data.clone()), Ok(3));
    assert_eq!(engine.state().wave, 3);
    assert_eq!(engine.spawn_queue().len(), 2);
    assert!(engine.state().is_playing);

    let snap = engine.tick();
    assert_eq!(snap.enemies[0].kind, EnemyKind::Tank);
    assert!((snap.enemies[0].max_hp - (120.0 + 120.0 * 1.05)).abs() < 1e-9);

    assert_eq!(
        engine.start_synced_wave(data),
        Err(ActionError::WaveInProgress)
    );
}

// ---- Movement ----

#[test]
fn test_frozen_enemy_moves_at_half_speed() {
    let mut world = World::new();
    let mut next_id = 0;
    let map = MapDefinition::default();
    let entity = world_setup::spawn_enemy(&mut world, &mut next_id, &map, EnemyKind::Normal, 1);
    world.get::<&mut Enemy>(entity).unwrap().frozen_ticks = 1;

    let mut buffer = Vec::new();
    movement::run(&mut world, &map, &mut buffer);
    assert!((world.get::<&Position>(entity).unwrap().x() - 0.75).abs() < 1e-9);
    assert_eq!(world.get::<&Enemy>(entity).unwrap().frozen_ticks, 0);

    movement::run(&mut world, &map, &mut buffer);
    assert!((world.get::<&Position>(entity).unwrap().x() - 2.25).abs() < 1e-9);
    assert!((world.get::<&Enemy>(entity).unwrap().distance_traveled - 2.25).abs() < 1e-9);
}

#[test]
fn test_enemy_snaps_onto_waypoint() {
    let mut world = World::new();
    let mut next_id = 0;
    let map = MapDefinition::default();
    let entity = world_setup::spawn_enemy(&mut world, &mut next_id, &map, EnemyKind::Normal, 1);
    world.get::<&mut Position>(entity).unwrap().0 = DVec2::new(219.0, 60.0);

    let mut buffer = Vec::new();
    movement::run(&mut world, &map, &mut buffer);

    let pos = *world.get::<&Position>(entity).unwrap();
    let enemy = world.get::<&Enemy>(entity).unwrap();
    assert_eq!(pos.0, DVec2::new(220.0, 60.0));
    assert_eq!(enemy.path_index, 2);
    assert!((enemy.distance_traveled - 1.0).abs() < 1e-9);
}

#[test]
fn test_leak_costs_a_life() {
    let mut engine = playing_engine(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(300.0, 600.0), 0.0);
    let entity = entity_of(&engine, id);
    engine.world_mut().get::<&mut Enemy>(entity).unwrap().path_index = 9;

    let snap = engine.tick();
    assert_eq!(snap.progress.lives, STARTING_LIVES - 1);
    assert_eq!(snap.enemies.len(), 0);
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::Alarm), 1);
    assert_eq!(snap.progress.money, STARTING_MONEY);
}

// ---- Targeting & firing ----

#[test]
fn test_tower_targets_leader_not_nearest() {
    let mut engine = playing_engine(SimConfig::default());
    engine.spawn_test_tower(TowerKind::Basic, DVec2::new(400.0, 400.0));
    let _trailing = engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(500.0, 400.0), 10.0);
    let leader = engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(300.0, 400.0), 20.0);

    let snap = engine.tick();

    let targets: Vec<EntityId> = engine
        .world()
        .query::<&Projectile>()
        .iter()
        .map(|(_, p)| p.target)
        .collect();
    assert_eq!(targets, vec![leader]);
    assert!(snap.towers[0].rotation.cos() < 0.0, "tower should face the leader");
    assert_eq!(
        count_cues(&snap, |e| matches!(e, AudioEvent::Shoot { sound: ShotSound::Normal })),
        1
    );
}

#[test]
fn test_tower_respects_cooldown() {
    let mut engine = playing_engine(SimConfig::default());
    engine.spawn_test_tower(TowerKind::Basic, DVec2::new(400.0, 400.0));
    engine.spawn_test_enemy(EnemyKind::Tank, DVec2::new(400.0, 300.0), 0.0);

    let mut shots = 0;
    for _ in 0..31 {
        let snap = engine.tick();
        shots += count_cues(&snap, |e| matches!(e, AudioEvent::Shoot { .. }));
    }
    // Fires on tick 0 and again on tick 30.
    assert_eq!(shots, 2);
}

#[test]
fn test_damage_perk_doubles_projectile_damage() {
    let mut engine = playing_engine(SimConfig::default());
    engine.spawn_test_tower(TowerKind::Basic, DVec2::new(400.0, 400.0));
    engine.spawn_test_enemy(EnemyKind::Tank, DVec2::new(400.0, 300.0), 0.0);
    engine.grant_perk(PerkKind::Damage);
    engine.activate_perk(PerkKind::Damage).unwrap();

    engine.tick();
    let damages: Vec<f64> = engine
        .world()
        .query::<&Projectile>()
        .iter()
        .map(|(_, p)| p.damage)
        .collect();
    assert_eq!(damages, vec![20.0]);
}

#[test]
fn test_second_sub_step_is_silent() {
    let mut engine = playing_engine(SimConfig {
        game_speed: 2,
        ..Default::default()
    });
    let tower = engine.spawn_test_tower(TowerKind::Basic, DVec2::new(400.0, 400.0));
    let entity = entity_of(&engine, tower);
    engine.world_mut().get::<&mut Tower>(entity).unwrap().cooldown = 1;
    engine.spawn_test_enemy(EnemyKind::Tank, DVec2::new(400.0, 300.0), 0.0);

    let mut driver = FixedTimestepDriver::new();
    let report = driver.advance_by(&mut engine, STEP_MS + 0.5);
    assert_eq!(report.quanta, 1);
    assert_eq!(report.ticks, 2);

    let projectiles = engine.world().query::<&Projectile>().iter().count();
    assert_eq!(projectiles, 2);
    let snap = engine.snapshot();
    assert_eq!(count_cues(&snap, |e| matches!(e, AudioEvent::Shoot { .. })), 1);
}

// ---- Projectiles ----

#[test]
fn test_area_damage_boundary_is_inclusive() {
    let mut world = World::new();
    let mut next_id = 0;
    let map = MapDefinition::default();

    let mut place = |world: &mut World, x: f64| {
        let entity = world_setup::spawn_enemy(world, &mut next_id, &map, EnemyKind::Normal, 1);
        world.get::<&mut Position>(entity).unwrap().0 = DVec2::new(x, 300.0);
        entity
    };
    let center = place(&mut world, 400.0);
    let edge = place(&mut world, 470.0);
    let outside = place(&mut world, 470.5);
    let target = *world.get::<&EntityId>(center).unwrap();

    world.spawn((
        EntityId(100),
        Position::new(400.0, 296.0),
        Velocity::default(),
        Projectile {
            target,
            damage: 20.0,
            speed: 6.0,
            kind: ProjectileKind::Area { blast_radius: 70.0 },
            effect: None,
            color: "#f97316".into(),
        },
    ));

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut audio = Vec::new();
    let mut buffer = Vec::new();
    projectiles::run(&mut world, &map, &mut rng, true, &mut audio, &mut buffer);

    let hp = |e| world.get::<&Enemy>(e).unwrap().hp;
    assert!((hp(center) - 20.5).abs() < 1e-9);
    assert!((hp(edge) - 20.5).abs() < 1e-9);
    assert!((hp(outside) - 40.5).abs() < 1e-9);
    assert_eq!(audio, vec![AudioEvent::Explosion]);
    assert_eq!(world.query::<&Projectile>().iter().count(), 0);
}

#[test]
fn test_frost_hit_freezes_target_only() {
    let mut world = World::new();
    let mut next_id = 0;
    let map = MapDefinition::default();
    let target_entity =
        world_setup::spawn_enemy(&mut world, &mut next_id, &map, EnemyKind::Normal, 1);
    let bystander = world_setup::spawn_enemy(&mut world, &mut next_id, &map, EnemyKind::Normal, 1);
    world.get::<&mut Position>(target_entity).unwrap().0 = DVec2::new(400.0, 300.0);
    world.get::<&mut Position>(bystander).unwrap().0 = DVec2::new(405.0, 300.0);
    let target = *world.get::<&EntityId>(target_entity).unwrap();

    world_setup::spawn_projectile(
        &mut world,
        &mut next_id,
        world_setup::Shot {
            origin: Position::new(396.0, 300.0),
            target,
            target_position: Position::new(400.0, 300.0),
            damage: 4.0,
            speed: 7.0,
            kind: ProjectileKind::Single,
            effect: Some(StatusEffect::Freeze),
            color: "#67e8f9",
        },
    );

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut audio = Vec::new();
    let mut buffer = Vec::new();
    projectiles::run(&mut world, &map, &mut rng, false, &mut audio, &mut buffer);

    assert_eq!(world.get::<&Enemy>(target_entity).unwrap().frozen_ticks, FREEZE_HIT_TICKS);
    assert_eq!(world.get::<&Enemy>(bystander).unwrap().frozen_ticks, 0);
    assert!((world.get::<&Enemy>(target_entity).unwrap().hp - 36.5).abs() < 1e-9);
    assert!(audio.is_empty(), "cues suppressed on silent sub-steps");
}

#[test]
fn test_stale_projectile_flies_straight_then_leaves() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.world_mut().spawn((
        EntityId(900),
        Position::new(780.0, 300.0),
        Velocity::new(10.0, 0.0),
        Projectile {
            target: EntityId(12345),
            damage: 10.0,
            speed: 10.0,
            kind: ProjectileKind::Single,
            effect: None,
            color: "#3b82f6".into(),
        },
    ));

    let snap = engine.tick();
    assert_eq!(snap.projectiles.len(), 1);
    assert_eq!(snap.projectiles[0].position, Position::new(790.0, 300.0));

    let snap = engine.tick();
    assert_eq!(snap.projectiles[0].position, Position::new(800.0, 300.0));

    let snap = engine.tick();
    assert!(snap.projectiles.is_empty());
}

// ---- Death & rewards ----

#[test]
fn test_kill_pays_reward_and_shows_text() {
    let mut engine = playing_engine(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyKind::Fast, DVec2::new(400.0, 400.0), 0.0);
    let entity = entity_of(&engine, id);
    engine.world_mut().get::<&mut Enemy>(entity).unwrap().hp = 0.0;

    let snap = engine.tick();
    assert_eq!(snap.enemies.len(), 0);
    assert_eq!(snap.progress.money, STARTING_MONEY + 15);
    assert!(snap.floating_texts.iter().any(|t| t.text == "+$15"));
    assert!(!snap.particles.is_empty());
}

#[test]
fn test_boss_always_drops_a_perk() {
    let mut engine = playing_engine(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyKind::Boss, DVec2::new(400.0, 400.0), 0.0);
    let entity = entity_of(&engine, id);
    engine.world_mut().get::<&mut Enemy>(entity).unwrap().hp = -5.0;

    let snap = engine.tick();
    assert_eq!(snap.perk_drops.len(), 1);
    assert_eq!(snap.progress.money, STARTING_MONEY + 200);
}

// ---- Wave progression ----

#[test]
fn test_wave_clear_waits_for_last_enemy() {
    let mut engine = playing_engine(SimConfig::default());
    let id = engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(400.0, 400.0), 0.0);

    // A living enemy keeps the wave open.
    for _ in 0..5 {
        let snap = engine.tick();
        assert!(snap.progress.is_playing);
        assert_eq!(count_cues(&snap, |e| *e == AudioEvent::WaveClear), 0);
    }

    let entity = entity_of(&engine, id);
    engine.world_mut().get::<&mut Enemy>(entity).unwrap().hp = 0.0;
    let snap = engine.tick();
    assert!(snap.progress.is_playing, "clear registers on the following tick");

    let snap = engine.tick();
    assert!(!snap.progress.is_playing);
    assert_eq!(snap.progress.wave, 2);
    assert_eq!(snap.progress.money, STARTING_MONEY + 10 + 60);
    assert_eq!(snap.progress.auto_start_timer, AUTO_START_TICKS);
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::WaveClear), 1);
}

#[test]
fn test_countdown_starts_wave_after_600_ticks() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.state_mut().auto_start_timer = AUTO_START_TICKS;

    let mut beeps = 0;
    for _ in 0..599 {
        let snap = engine.tick();
        beeps += count_cues(&snap, |e| *e == AudioEvent::Tick);
        assert!(!snap.progress.is_playing);
    }
    assert_eq!(beeps, 3);
    assert_eq!(engine.state().auto_start_timer, 1);

    let snap = engine.tick();
    assert!(snap.progress.is_playing);
    assert_eq!(snap.progress.auto_start_timer, -1);
    assert!(snap
        .audio_events
        .contains(&AudioEvent::WaveStart { boss: false }));
}

#[test]
fn test_countdown_beeps_at_double_speed() {
    let mut engine = SimulationEngine::new(SimConfig {
        game_speed: 2,
        ..Default::default()
    });
    engine.state_mut().auto_start_timer = AUTO_START_TICKS;

    let mut driver = FixedTimestepDriver::new();
    let mut beeps = 0;
    for _ in 0..AUTO_START_TICKS / 2 {
        let report = driver.advance_by(&mut engine, STEP_MS);
        assert_eq!(report.ticks, 2);
        let snap = engine.snapshot();
        beeps += count_cues(&snap, |e| *e == AudioEvent::Tick);
    }
    assert_eq!(beeps, 3);
    assert!(engine.state().is_playing);
}

#[test]
fn test_manual_start_cancels_countdown() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.state_mut().auto_start_timer = 300;
    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick();
    assert!(snap.progress.is_playing);
    assert_eq!(snap.progress.auto_start_timer, -1);
}

#[test]
fn test_no_countdown_without_auto_start() {
    let mut engine = playing_engine(SimConfig {
        auto_start: false,
        ..Default::default()
    });
    engine.tick();
    assert_eq!(engine.state().wave, 2);
    assert_eq!(engine.state().auto_start_timer, -1);
    assert_eq!(engine.phase(), GamePhase::Idle);
}

// ---- Game over ----

#[test]
fn test_game_over_freezes_simulation() {
    let mut engine = playing_engine(SimConfig::default());
    let recorded = Arc::new(Mutex::new(Vec::new()));
    engine.set_progress_reporter(Box::new(Recorder(recorded.clone())));
    engine.state_mut().lives = 1;
    engine.state_mut().wave = 4;

    let id = engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(300.0, 600.0), 0.0);
    let entity = entity_of(&engine, id);
    engine.world_mut().get::<&mut Enemy>(entity).unwrap().path_index = 9;
    engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(400.0, 400.0), 0.0);

    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::GameOver);
    assert_eq!(snap.progress.lives, 0);
    assert!(snap.audio_events.contains(&AudioEvent::GameOver { wave: 4 }));
    let frozen_at = engine.time().tick;
    let json_before = serde_json::to_string(&engine.snapshot().enemies).unwrap();

    for _ in 0..20 {
        engine.tick();
    }
    assert_eq!(engine.time().tick, frozen_at);
    assert_eq!(serde_json::to_string(&engine.snapshot().enemies).unwrap(), json_before);

    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick();
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::Reject), 1);
    assert_eq!(*recorded.lock().unwrap(), vec![4]);

    engine.queue_command(PlayerCommand::Reset);
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Idle);
    assert_eq!(snap.progress.lives, STARTING_LIVES);
    assert_eq!(snap.progress.wave, 1);
    assert!(snap.enemies.is_empty());
}

// ---- Economy & placement ----

#[test]
fn test_placement_near_path_rejected_with_funds() {
    let mut engine = SimulationEngine::new(SimConfig {
        starting_money: 10_000,
        ..Default::default()
    });
    let result = engine.place_tower(TowerKind::Basic, DVec2::new(225.0, 110.0));
    assert_eq!(result, Err(ActionError::BlockedByPath));
    assert_eq!(engine.state().money, 10_000);
    assert_eq!(
        engine.preview_placement(TowerKind::Basic, DVec2::new(225.0, 110.0)),
        Err(ActionError::BlockedByPath)
    );
    let snap = engine.snapshot();
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::Reject), 1);
    assert!(snap.towers.is_empty());
}

#[test]
fn test_towers_need_clearance() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.place_tower(TowerKind::Basic, DVec2::new(100.0, 140.0)).unwrap();
    assert_eq!(
        engine.place_tower(TowerKind::Basic, DVec2::new(110.0, 150.0)),
        Err(ActionError::BlockedByTower)
    );
    assert!(engine.place_tower(TowerKind::Basic, DVec2::new(140.0, 140.0)).is_ok());
    assert_eq!(engine.state().money, STARTING_MONEY - 100);
}

#[test]
fn test_placement_off_the_board_rejected() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    for point in [DVec2::new(-30.0, 300.0), DVec2::new(812.0, 300.0), DVec2::new(400.0, 605.0)] {
        assert_eq!(
            engine.preview_placement(TowerKind::Basic, point),
            Err(ActionError::OutOfBounds)
        );
        assert_eq!(
            engine.place_tower(TowerKind::Basic, point),
            Err(ActionError::OutOfBounds)
        );
    }
    assert_eq!(engine.state().money, STARTING_MONEY);
    assert!(engine.snapshot().towers.is_empty());
}

#[test]
fn test_money_never_goes_negative() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    for x in [60.0, 100.0, 140.0, 180.0] {
        engine.place_tower(TowerKind::Basic, DVec2::new(x, 180.0)).unwrap();
    }
    assert_eq!(engine.state().money, 0);
    assert_eq!(
        engine.place_tower(TowerKind::Basic, DVec2::new(60.0, 260.0)),
        Err(ActionError::InsufficientFunds {
            needed: 50,
            available: 0
        })
    );
    assert_eq!(engine.state().money, 0);
}

#[test]
fn test_upgrade_and_sell_math() {
    let mut engine = SimulationEngine::new(SimConfig {
        starting_money: 500,
        ..Default::default()
    });
    let id = engine.place_tower(TowerKind::Frost, DVec2::new(100.0, 140.0)).unwrap();
    assert_eq!(engine.state().money, 400);

    assert_eq!(engine.upgrade_tower(id), Ok(2));
    assert_eq!(engine.state().money, 320);

    let snap = engine.snapshot();
    let tower = &snap.towers[0];
    assert!((tower.damage - 4.0 * UPGRADE_DAMAGE_FACTOR).abs() < 1e-9);
    assert!((tower.range - 100.0 * UPGRADE_RANGE_FACTOR).abs() < 1e-9);
    assert_eq!(tower.upgrade_cost, Some(160));
    assert_eq!(tower.sell_refund, 140);

    assert_eq!(engine.sell_tower(id), Ok(140));
    assert_eq!(engine.state().money, 460);
    assert_eq!(
        engine.sell_tower(id),
        Err(ActionError::UnknownTower { id })
    );
}

#[test]
fn test_upgrade_stops_at_max_level() {
    let mut engine = SimulationEngine::new(SimConfig {
        starting_money: 1_000,
        ..Default::default()
    });
    let id = engine.place_tower(TowerKind::Basic, DVec2::new(100.0, 140.0)).unwrap();
    assert_eq!(engine.upgrade_tower(id), Ok(2));
    assert_eq!(engine.upgrade_tower(id), Ok(3));
    let money = engine.state().money;
    assert_eq!(engine.upgrade_tower(id), Err(ActionError::MaxLevel));
    assert_eq!(engine.state().money, money);
    assert_eq!(engine.snapshot().towers[0].upgrade_cost, None);
}

#[test]
fn test_invalid_speed_command_rejected() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(PlayerCommand::SetGameSpeed { speed: 3 });
    let snap = engine.tick();
    assert_eq!(snap.progress.game_speed, 1);
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::Reject), 1);

    engine.queue_command(PlayerCommand::SetGameSpeed { speed: 2 });
    assert_eq!(engine.tick().progress.game_speed, 2);
}

// ---- Perks ----

#[test]
fn test_damage_perk_replaces_existing_entry() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.grant_perk(PerkKind::Damage);
    engine.grant_perk(PerkKind::Damage);

    engine.activate_perk(PerkKind::Damage).unwrap();
    for _ in 0..100 {
        engine.tick();
    }
    engine.activate_perk(PerkKind::Damage).unwrap();

    let active = engine.perks().active();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].end_tick, 100 + TIMED_PERK_TICKS);
    assert_eq!(
        engine.activate_perk(PerkKind::Damage),
        Err(ActionError::EmptyPerk {
            kind: PerkKind::Damage
        })
    );
}

#[test]
fn test_timed_perk_expires() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.grant_perk(PerkKind::Speed);
    engine.activate_perk(PerkKind::Speed).unwrap();
    for _ in 0..TIMED_PERK_TICKS {
        engine.tick();
    }
    assert!(engine.perks().is_active(PerkKind::Speed));
    engine.tick();
    assert!(!engine.perks().is_active(PerkKind::Speed));
}

#[test]
fn test_instant_perks() {
    let mut engine = playing_engine(SimConfig::default());
    let a = engine.spawn_test_enemy(EnemyKind::Normal, DVec2::new(400.0, 400.0), 0.0);
    let b = engine.spawn_test_enemy(EnemyKind::Tank, DVec2::new(500.0, 400.0), 0.0);
    engine.grant_perk(PerkKind::Freeze);
    engine.grant_perk(PerkKind::Money);

    engine.activate_perk(PerkKind::Freeze).unwrap();
    for id in [a, b] {
        let entity = entity_of(&engine, id);
        assert_eq!(
            engine.world().get::<&Enemy>(entity).unwrap().frozen_ticks,
            FREEZE_PERK_TICKS
        );
    }

    engine.activate_perk(PerkKind::Money).unwrap();
    assert_eq!(engine.state().money, STARTING_MONEY + MONEY_PERK_AMOUNT);
    assert!(engine.perks().active().is_empty());
}

#[test]
fn test_pickup_collects_nearby_drops() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.spawn_test_drop(PerkKind::Speed, DVec2::new(300.0, 300.0));
    engine.spawn_test_drop(PerkKind::Money, DVec2::new(500.0, 300.0));

    assert_eq!(engine.pickup_drops(DVec2::new(320.0, 300.0)), Ok(1));
    assert_eq!(engine.perks().count(PerkKind::Speed), 1);
    assert_eq!(engine.pickup_drops(DVec2::new(320.0, 300.0)), Ok(0));
    assert_eq!(engine.world().query::<&PerkDrop>().iter().count(), 1);

    let snap = engine.snapshot();
    assert_eq!(count_cues(&snap, |e| *e == AudioEvent::PerkPickup), 1);
    assert_eq!(snap.inventory.get(&PerkKind::Speed), Some(&1));
}

#[test]
fn test_drops_expire() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.spawn_test_drop(PerkKind::Damage, DVec2::new(300.0, 300.0));
    for _ in 0..PERK_DROP_LIFETIME - 1 {
        engine.tick();
    }
    assert_eq!(engine.world().query::<&PerkDrop>().iter().count(), 1);
    engine.tick();
    assert_eq!(engine.world().query::<&PerkDrop>().iter().count(), 0);
}

#[test]
fn test_floating_text_rises_and_fades() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let id = engine.place_tower(TowerKind::Basic, DVec2::new(100.0, 140.0)).unwrap();
    engine.sell_tower(id).unwrap();

    let snap = engine.tick();
    let text = &snap.floating_texts[0];
    assert_eq!(text.text, "+$35");
    assert!(text.position.y() < 140.0);
    assert!(text.alpha < 1.0);

    for _ in 0..FLOATING_TEXT_TICKS {
        engine.tick();
    }
    assert_eq!(engine.world().query::<&FloatingText>().iter().count(), 0);
}
