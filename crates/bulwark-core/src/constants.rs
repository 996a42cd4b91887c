//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Wall-clock milliseconds covered by one simulation quantum.
pub const STEP_MS: f64 = 1000.0 / TICK_RATE as f64;

/// Upper bound on accumulated frame time, so a stalled host does not
/// trigger an unbounded catch-up burst.
pub const MAX_ACCUMULATOR_MS: f64 = 250.0;

// --- Economy ---

/// Money at the start of a game.
pub const STARTING_MONEY: i64 = 200;

/// Lives at the start of a game.
pub const STARTING_LIVES: i32 = 20;

/// Flat bonus for clearing a wave.
pub const WAVE_CLEAR_BASE_BONUS: i64 = 50;

/// Additional wave-clear bonus per cleared wave number.
pub const WAVE_CLEAR_BONUS_PER_WAVE: i64 = 10;

/// Ticks between a wave clear and the automatic start of the next wave.
pub const AUTO_START_TICKS: i32 = 600;

/// Countdown values (ticks remaining) that produce a tick cue.
pub const COUNTDOWN_BEEP_TICKS: [i32; 3] = [180, 120, 60];

/// Allowed game speed multipliers.
pub const GAME_SPEEDS: [u32; 2] = [1, 2];

// --- Waves ---

/// Enemies in wave `w` = WAVE_BASE_COUNT + floor(w * WAVE_COUNT_PER_WAVE).
pub const WAVE_BASE_COUNT: u32 = 5;
pub const WAVE_COUNT_PER_WAVE: f64 = 1.5;

/// Spawn delays in ticks.
pub const SPAWN_DELAY_DEFAULT: u32 = 30;
pub const SPAWN_DELAY_FAST: u32 = 15;
pub const SPAWN_DELAY_TANK: u32 = 60;
pub const SPAWN_DELAY_BOSS: u32 = 120;

/// Fast enemies appear from this wave onward (exclusive bound).
pub const FAST_AFTER_WAVE: u32 = 2;

/// Tanks appear from this wave onward (exclusive bound).
pub const TANK_AFTER_WAVE: u32 = 4;

/// Every Nth wave ends with a boss.
pub const BOSS_WAVE_INTERVAL: u32 = 5;

/// Enemy hp grows by this fraction of its base per wave number.
pub const HP_SCALE_PER_WAVE: f64 = 0.35;

// --- Status effects ---

/// Freeze duration applied by a frost projectile hit.
pub const FREEZE_HIT_TICKS: u32 = 90;

/// Shock marker duration applied by a shock projectile hit.
pub const SHOCK_MARK_TICKS: u32 = 30;

/// Movement speed multiplier while frozen.
pub const FROZEN_SPEED_FACTOR: f64 = 0.5;

// --- Combat ---

/// Distance from a tower center to its muzzle, along its facing.
pub const MUZZLE_OFFSET: f64 = 20.0;

/// Damage multiplier while the damage perk is active.
pub const DAMAGE_PERK_MULTIPLIER: f64 = 2.0;

/// Cooldown divisor while the speed perk is active.
pub const SPEED_PERK_DIVISOR: f64 = 2.0;

// --- Placement ---

/// Size of a placement grid cell. Towers snap to cell centers.
pub const GRID_CELL: f64 = 40.0;

/// Minimum distance between a tower center and any path segment.
pub const PATH_CLEARANCE: f64 = 30.0;

/// Minimum distance between two tower centers.
pub const TOWER_CLEARANCE: f64 = 30.0;

/// Maximum tower level.
pub const MAX_TOWER_LEVEL: u8 = 3;

/// Upgrade cost factor: floor(base_cost * UPGRADE_COST_FACTOR * level).
pub const UPGRADE_COST_FACTOR: f64 = 0.8;

/// Sell refund factor: floor(base_cost * SELL_REFUND_FACTOR * level).
pub const SELL_REFUND_FACTOR: f64 = 0.7;

/// Damage multiplier per upgrade.
pub const UPGRADE_DAMAGE_FACTOR: f64 = 1.3;

/// Range multiplier per upgrade.
pub const UPGRADE_RANGE_FACTOR: f64 = 1.1;

// --- Perks ---

/// Drop chance for non-boss enemies.
pub const PERK_DROP_CHANCE: f64 = 0.05;

/// Ticks a drop stays on the field before vanishing.
pub const PERK_DROP_LIFETIME: u32 = 600;

/// Pickup radius around a drop.
pub const PICKUP_RADIUS: f64 = 30.0;

/// Duration of the damage and speed perks.
pub const TIMED_PERK_TICKS: u64 = 600;

/// Cash granted by the money perk.
pub const MONEY_PERK_AMOUNT: i64 = 150;

/// Freeze applied to every enemy by the freeze perk.
pub const FREEZE_PERK_TICKS: u32 = 180;

// --- Cosmetics ---

/// Particles spawned by a single-target hit.
pub const IMPACT_PARTICLES: usize = 4;

/// Particles spawned by an area explosion.
pub const EXPLOSION_PARTICLES: usize = 14;

/// Particles spawned by an enemy death.
pub const DEATH_PARTICLES: usize = 8;

/// Per-tick velocity retention of particles.
pub const PARTICLE_FRICTION: f64 = 0.92;

/// Floating text lifetime and rise speed.
pub const FLOATING_TEXT_TICKS: u32 = 45;
pub const FLOATING_TEXT_RISE: f64 = 0.6;

// --- Relay ---

/// Players per match.
pub const PLAYERS_PER_MATCH: usize = 2;

/// Ticks a client waits for a join answer before reporting a retryable status.
pub const JOIN_TIMEOUT_TICKS: u64 = 600;
