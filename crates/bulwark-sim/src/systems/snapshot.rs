//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only: it never modifies the world.

use hecs::World;

use bulwark_core::components::*;
use bulwark_core::events::{Alert, AudioEvent, Haptic};
use bulwark_core::map::MapDefinition;
use bulwark_core::state::*;
use bulwark_core::types::{EntityId, Position};

use crate::economy::GameState;
use crate::perks::PerkState;
use crate::placement;

/// Per-tick feedback drained from the engine into a snapshot.
#[derive(Debug, Default)]
pub struct Feedback {
    pub audio_events: Vec<AudioEvent>,
    pub haptics: Vec<Haptic>,
    pub alerts: Vec<Alert>,
}

/// Build a complete GameStateSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    state: &GameState,
    perks: &PerkState,
    map: &MapDefinition,
    pending_spawns: usize,
    feedback: Feedback,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: state.time,
        phase: state.phase(),
        theme: map.theme,
        progress: ProgressView {
            money: state.money,
            lives: state.lives,
            wave: state.wave,
            is_playing: state.is_playing,
            is_game_over: state.is_game_over,
            auto_start_timer: state.auto_start_timer,
            game_speed: state.game_speed,
            pending_spawns: pending_spawns as u32,
        },
        path: map.waypoints.iter().map(|w| Position(*w)).collect(),
        towers: build_towers(world),
        enemies: build_enemies(world),
        projectiles: build_projectiles(world),
        particles: build_particles(world),
        floating_texts: build_floating_texts(world),
        perk_drops: build_perk_drops(world),
        active_perks: build_active_perks(perks, state.time.tick),
        inventory: perks.inventory().clone(),
        alerts: feedback.alerts,
        audio_events: feedback.audio_events,
        haptics: feedback.haptics,
    }
}

fn build_towers(world: &World) -> Vec<TowerView> {
    let mut towers: Vec<TowerView> = world
        .query::<(&EntityId, &Position, &Tower)>()
        .iter()
        .map(|(_, (id, pos, tower))| TowerView {
            id: *id,
            kind: tower.kind,
            position: *pos,
            range: tower.range,
            damage: tower.damage,
            rotation: tower.rotation,
            level: tower.level,
            upgrade_cost: placement::quote_upgrade(tower).ok(),
            sell_refund: placement::quote_sale(tower),
        })
        .collect();

    towers.sort_by_key(|t| t.id);
    towers
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<EnemyView> = world
        .query::<(&EntityId, &Position, &Enemy)>()
        .iter()
        .map(|(_, (id, pos, enemy))| EnemyView {
            id: *id,
            kind: enemy.kind,
            position: *pos,
            hp: enemy.hp,
            max_hp: enemy.max_hp,
            frozen: enemy.frozen_ticks > 0,
            shocked: enemy.shock_ticks > 0,
            color: enemy.color.clone(),
            radius: enemy.radius,
        })
        .collect();

    enemies.sort_by_key(|e| e.id);
    enemies
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    let mut projectiles: Vec<ProjectileView> = world
        .query::<(&EntityId, &Position, &Projectile)>()
        .iter()
        .map(|(_, (id, pos, projectile))| ProjectileView {
            id: *id,
            position: *pos,
            kind: projectile.kind,
            color: projectile.color.clone(),
        })
        .collect();

    projectiles.sort_by_key(|p| p.id);
    projectiles
}

fn build_particles(world: &World) -> Vec<ParticleView> {
    world
        .query::<(&Position, &Particle)>()
        .iter()
        .map(|(_, (pos, particle))| ParticleView {
            position: *pos,
            alpha: particle.life as f64 / particle.max_life.max(1) as f64,
            color: particle.color.clone(),
            size: particle.size,
        })
        .collect()
}

fn build_floating_texts(world: &World) -> Vec<FloatingTextView> {
    world
        .query::<(&Position, &FloatingText)>()
        .iter()
        .map(|(_, (pos, text))| FloatingTextView {
            position: *pos,
            text: text.text.clone(),
            alpha: text.life as f64 / bulwark_core::constants::FLOATING_TEXT_TICKS as f64,
            color: text.color.clone(),
        })
        .collect()
}

fn build_perk_drops(world: &World) -> Vec<PerkDropView> {
    let mut drops: Vec<PerkDropView> = world
        .query::<(&EntityId, &Position, &PerkDrop)>()
        .iter()
        .map(|(_, (id, pos, drop))| PerkDropView {
            id: *id,
            kind: drop.kind,
            position: *pos,
            life: drop.life,
        })
        .collect();

    drops.sort_by_key(|d| d.id);
    drops
}

fn build_active_perks(perks: &PerkState, now: u64) -> Vec<ActivePerkView> {
    let mut views: Vec<ActivePerkView> = perks
        .active()
        .iter()
        .map(|p| ActivePerkView {
            kind: p.kind,
            end_tick: p.end_tick,
            duration: p.duration,
            remaining_ratio: p.end_tick.saturating_sub(now) as f64 / p.duration.max(1) as f64,
        })
        .collect();

    views.sort_by_key(|p| p.kind);
    views
}
