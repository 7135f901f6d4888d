//! Simulation tuning constants.
//!
//! These are gameplay balance values, not operator configuration; changing
//! them changes the game. Distances are world units unless noted.

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: f32 = 20.0;
/// Map area allotted per generated city; total area scales with player count.
pub const AREA_PER_CITY: f32 = 80_000.0;
/// Map height : width.
pub const MAP_ASPECT: f32 = 9.0 / 16.0;

/// Starting minimum Manhattan distance between cities, in cells.
pub const CITY_SPACING_CELLS: i32 = 15;
/// Consecutive rejections before the spacing requirement is relaxed by one.
pub const CITY_PLACE_TRIES: u32 = 100;
/// Cities never sit within this many cells of the map edge.
pub const CITY_EDGE_MARGIN: usize = 1;

pub const TROOP_MAX_HEALTH: f32 = 100.0;
/// Distance penalty ramp for healing: penalty = (dist + START) / FULL,
/// floored at MIN.
pub const HEAL_DIST_START: f32 = 250.0;
pub const HEAL_DIST_FULL: f32 = 1000.0;
pub const HEAL_DIST_PENALTY_MIN: f32 = 0.5;
/// Healing power is divided by this before it is applied to health.
pub const HEALING_DIVISOR: f32 = 25.0;
/// Chip damage per tick for a player holding no city.
pub const NO_CITY_HEALING: f32 = -0.5;
/// Weight of the averaged enemy border claim in the healing formula.
pub const BORDER_HEALING_MOD: f32 = 0.5;

/// Per-tick step length before the terrain speed multiplier.
pub const BASE_STEP: f32 = 0.15;
/// Combat acquisition radius.
pub const ATTACK_RANGE: f32 = 32.0;
/// Terrain attack multiplier is divided by this to get per-tick damage.
pub const ATTACK_DIVISOR: f32 = 25.0;
/// Minimum separation restored between troops of the same player.
pub const ALLY_SPACING: f32 = 16.0;
/// Minimum separation restored between troops of opposing players.
pub const ENEMY_SPACING: f32 = 30.0;

/// A troop within this radius of a city center counts toward its occupancy.
pub const CITY_CAPTURE_RADIUS: f32 = 15.0;

pub const TROOP_VISION_RADIUS: f32 = 75.0;
pub const CITY_VISION_RADIUS: f32 = 175.0;
pub const TROOP_BORDER_RADIUS: f32 = 40.0;
pub const CITY_BORDER_RADIUS: f32 = 80.0;
/// Border brushes mark slowly; claims build and decay over many ticks.
pub const BORDER_BRUSH_STRENGTH: f32 = 0.05;

/// Vision values below this are considered seen; troops above it are fogged.
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// Seconds of production per troop-per-city of the owner.
pub const PRODUCTION_INTERVAL_SECS: f32 = 20.0;
/// Production halts once the owner has this many troops per owned city.
pub const TROOPS_PER_CITY_CAP: f32 = 10.0;
/// New troops spawn offset from the city center by up to this much per axis.
pub const SPAWN_JITTER: f32 = 6.0;
