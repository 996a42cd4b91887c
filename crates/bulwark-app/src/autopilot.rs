//! Scripted player for headless runs.
//!
//! Reads only the published snapshot and answers with ordinary player
//! commands, so it exercises the same paths a human host would.

use glam::DVec2;

use bulwark_core::commands::PlayerCommand;
use bulwark_core::constants::{GRID_CELL, PATH_CLEARANCE, TOWER_CLEARANCE};
use bulwark_core::enums::TowerKind;
use bulwark_core::geometry::{distance_to_segment, is_near_path, snap_to_grid};
use bulwark_core::map::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use bulwark_core::state::GameStateSnapshot;
use bulwark_core::tables::TowerStats;

/// Ticks to wait after issuing commands before deciding again.
const DECISION_INTERVAL: u64 = 30;

/// Candidate cells farther than this from the path are ignored.
const MAX_PATH_DISTANCE: f64 = 90.0;

/// Build order, repeated once exhausted.
const BUILD_ORDER: [TowerKind; 6] = [
    TowerKind::Basic,
    TowerKind::Basic,
    TowerKind::Frost,
    TowerKind::Aoe,
    TowerKind::Laser,
    TowerKind::Shock,
];

#[derive(Debug, Default)]
pub struct Autopilot {
    next_decision_tick: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands to issue in response to `snapshot`. Empty while cooling down.
    pub fn decide(&mut self, snapshot: &GameStateSnapshot) -> Vec<PlayerCommand> {
        let progress = &snapshot.progress;
        if progress.is_game_over || snapshot.time.tick < self.next_decision_tick {
            return Vec::new();
        }

        let mut commands = Vec::new();

        for drop in &snapshot.perk_drops {
            commands.push(PlayerCommand::PickupDrop {
                x: drop.position.0.x,
                y: drop.position.0.y,
            });
        }

        if progress.is_playing {
            for (&kind, &count) in &snapshot.inventory {
                if count > 0 {
                    commands.push(PlayerCommand::ActivatePerk { kind });
                }
            }
        }

        let kind = BUILD_ORDER[snapshot.towers.len() % BUILD_ORDER.len()];
        if progress.money >= TowerStats::for_kind(kind).cost {
            if let Some(cell) = pick_cell(snapshot) {
                commands.push(PlayerCommand::PlaceTower {
                    kind,
                    x: cell.x,
                    y: cell.y,
                });
            }
        }

        if !progress.is_playing && progress.auto_start_timer < 0 {
            commands.push(PlayerCommand::StartWave);
        }

        if !commands.is_empty() {
            self.next_decision_tick = snapshot.time.tick + DECISION_INTERVAL;
        }
        commands
    }
}

/// The free grid cell closest to the path, searching from the entrance.
fn pick_cell(snapshot: &GameStateSnapshot) -> Option<DVec2> {
    let path: Vec<DVec2> = snapshot.path.iter().map(|p| p.0).collect();
    let cols = (PLAYFIELD_WIDTH / GRID_CELL) as i32;
    let rows = (PLAYFIELD_HEIGHT / GRID_CELL) as i32;

    let mut best: Option<(f64, DVec2)> = None;
    for col in 0..cols {
        for row in 0..rows {
            let probe = DVec2::new(
                (col as f64 + 0.5) * GRID_CELL,
                (row as f64 + 0.5) * GRID_CELL,
            );
            let center = snap_to_grid(probe, GRID_CELL);
            if is_near_path(center, &path, PATH_CLEARANCE) {
                continue;
            }
            let crowded = snapshot
                .towers
                .iter()
                .any(|t| t.position.0.distance(center) < TOWER_CLEARANCE);
            if crowded {
                continue;
            }
            let d = path
                .windows(2)
                .map(|w| distance_to_segment(center, w[0], w[1]))
                .fold(f64::INFINITY, f64::min);
            if d > MAX_PATH_DISTANCE {
                continue;
            }
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, center));
            }
        }
    }
    best.map(|(_, c)| c)
}
