//! Tower placement validation, upgrades and sales.
//!
//! The same check backs the live placement preview and the commit, so a
//! preview that shows a cell as valid always commits.

use glam::DVec2;
use hecs::World;

use bulwark_core::components::Tower;
use bulwark_core::constants::*;
use bulwark_core::error::ActionError;
use bulwark_core::enums::TowerKind;
use bulwark_core::geometry::{is_near_path, snap_to_grid};
use bulwark_core::map::MapDefinition;
use bulwark_core::tables::{sell_refund, upgrade_cost, TowerStats};
use bulwark_core::types::{EntityId, Position};

/// Validate a placement at `point` and return the snapped cell center.
///
/// Checks funds first, then that the cell is on the board, then path and tower clearance.
pub fn check_placement(
    world: &World,
    map: &MapDefinition,
    money: i64,
    kind: TowerKind,
    point: DVec2,
) -> Result<DVec2, ActionError> {
    let cost = TowerStats::for_kind(kind).cost;
    if money < cost {
        return Err(ActionError::InsufficientFunds {
            needed: cost,
            available: money,
        });
    }

    let center = snap_to_grid(point, GRID_CELL);
    if !map.contains(center) {
        return Err(ActionError::OutOfBounds);
    }
    if is_near_path(center, &map.waypoints, PATH_CLEARANCE) {
        return Err(ActionError::BlockedByPath);
    }

    let crowded = world
        .query::<(&Position, &Tower)>()
        .iter()
        .any(|(_, (pos, _))| pos.0.distance(center) < TOWER_CLEARANCE);
    if crowded {
        return Err(ActionError::BlockedByTower);
    }

    Ok(center)
}

/// Find the hecs entity of the tower with stable id `id`.
pub fn find_tower(world: &World, id: EntityId) -> Result<hecs::Entity, ActionError> {
    world
        .query::<(&EntityId, &Tower)>()
        .iter()
        .find(|(_, (eid, _))| **eid == id)
        .map(|(entity, _)| entity)
        .ok_or(ActionError::UnknownTower { id })
}

/// Cost to raise `tower` one level, or `MaxLevel`.
pub fn quote_upgrade(tower: &Tower) -> Result<i64, ActionError> {
    if tower.level >= MAX_TOWER_LEVEL {
        return Err(ActionError::MaxLevel);
    }
    Ok(upgrade_cost(tower.base_cost, tower.level))
}

/// Apply one upgrade tier. The caller has already charged for it.
pub fn apply_upgrade(tower: &mut Tower) {
    tower.damage *= UPGRADE_DAMAGE_FACTOR;
    tower.range *= UPGRADE_RANGE_FACTOR;
    tower.level += 1;
}

/// Refund for selling `tower` at its current level.
pub fn quote_sale(tower: &Tower) -> i64 {
    sell_refund(tower.base_cost, tower.level)
}
