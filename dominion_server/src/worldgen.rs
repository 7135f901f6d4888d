//! Procedural world generation.
//!
//! Produces the immutable terrain of a match: a layered-noise elevation
//! field shaped into a continent with a coastline, a forest-density field
//! suppressed outside the plains/hill elevation band, a default-vision
//! baseline, and a set of city sites placed by rejection sampling. Start
//! cities are then assigned to players by geometric role so that 2-6
//! players are spread around the map perimeter.
//!
//! All randomness flows from one seedable RNG so a map can be reproduced
//! from its seed.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use dominion_shared::{
    grid::{ScalarGrid, WorldDims},
    math::Vec2,
    terrain::TerrainKind,
};

use crate::consts::{
    AREA_PER_CITY, CELL_SIZE, CITY_EDGE_MARGIN, CITY_PLACE_TRIES, CITY_SPACING_CELLS, MAP_ASPECT,
};

/// Immutable world state shared by the whole match.
#[derive(Debug, Clone)]
pub struct World {
    pub dims: WorldDims,
    pub elevation: ScalarGrid,
    pub forest: ScalarGrid,
    /// Fog baseline each player's vision grid is reset to every tick.
    /// Derived from elevation and forest only, independent of players.
    pub default_vision: ScalarGrid,
}

impl World {
    /// Resolves the terrain at a world position.
    pub fn terrain_at(&self, pos: Vec2) -> TerrainKind {
        let (gx, gy) = self.dims.to_grid(pos);
        TerrainKind::classify(self.elevation.sample(gx, gy), self.forest.sample(gx, gy))
    }
}

/// Output of generation: the world plus city sites and per-player start
/// cities (indices into `city_sites`).
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub world: World,
    pub city_sites: Vec<Vec2>,
    pub start_sites: Vec<usize>,
}

/// Map geometry scales with the number of cities the match needs.
pub fn dims_for(players: usize, cities_per_player: usize) -> WorldDims {
    let area = (players * cities_per_player) as f32 * AREA_PER_CITY;
    let width = (area / MAP_ASPECT).sqrt();
    let height = width * MAP_ASPECT;
    WorldDims::new(
        (width as usize) / CELL_SIZE as usize,
        (height as usize) / CELL_SIZE as usize,
        CELL_SIZE,
    )
}

/// Generates a complete map. `players` must already be sanitized to the
/// supported 2..=6 range.
pub fn generate(players: usize, cities_per_player: usize, seed: Option<u64>) -> GeneratedMap {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let dims = dims_for(players, cities_per_player);

    let elevation = generate_elevation(&dims, rng.gen());
    let forest = generate_forest(&dims, rng.gen(), &elevation);
    let default_vision = generate_default_vision(&dims, &elevation, &forest);

    let city_sites = place_cities(
        &dims,
        &elevation,
        &forest,
        players * cities_per_player,
        &mut rng,
    );
    let start_sites = assign_starts(&dims, &city_sites, players);

    info!(
        rows = dims.rows,
        cols = dims.cols,
        cities = city_sites.len(),
        players,
        "world generated"
    );

    GeneratedMap {
        world: World {
            dims,
            elevation,
            forest,
            default_vision,
        },
        city_sites,
        start_sites,
    }
}

/// Raises elevation in a mid-radius band around the map center and lowers it
/// toward both the exact center and the outer edge, shaping the noise into a
/// continent with a coastline.
fn coastal_bias(dims: &WorldDims, x: f32, y: f32) -> f32 {
    let cx = dims.rows as f32 / 2.0;
    let cy = dims.cols as f32 / 2.0;
    let dx = (x - cx).abs();
    let dy = (y - cy).abs();
    let dist = (dx * dx + dy * dy).sqrt();
    let max_dist = (cx * cx + cy * cy).sqrt();
    let nd = dist / max_dist;

    if nd <= 0.5 {
        0.5 + nd.max(0.25)
    } else {
        1.0 - (nd - 0.5) * 2.0
    }
}

fn generate_elevation(dims: &WorldDims, seed: u32) -> ScalarGrid {
    let fbm = Fbm::<Perlin>::new(seed).set_octaves(3);
    let mut grid = ScalarGrid::for_dims(dims);
    for x in 0..=dims.rows {
        for y in 0..=dims.cols {
            let n = 0.5 * fbm.get([x as f64 / 25.0, y as f64 / 25.0]) as f32;
            let bias = coastal_bias(dims, x as f32, y as f32);
            grid.set(x, y, (n - 0.2) + (bias * 1.2 - 0.2));
        }
    }
    grid
}

/// Forests grow from their own noise field but are suppressed the further
/// elevation falls outside the plains/hill band.
fn generate_forest(dims: &WorldDims, seed: u32, elevation: &ScalarGrid) -> ScalarGrid {
    let perlin = Perlin::new(seed);
    let plains_floor = TerrainKind::Plains.threshold() + 0.1;
    let hill_ceiling = TerrainKind::Hill.threshold() - 0.1;
    let band_penalty = 10.0;

    let mut grid = ScalarGrid::for_dims(dims);
    for x in 0..=dims.rows {
        for y in 0..=dims.cols {
            let n = 0.5 * perlin.get([x as f64 / 30.0, y as f64 / 30.0]) as f32;
            let base = n.min(0.6) * 2.0 + 0.3;
            let below = (plains_floor - elevation.get(x, y)).max(0.0);
            let above = (elevation.get(x, y) - hill_ceiling).max(0.0);
            grid.set(x, y, base - below * band_penalty - above * band_penalty);
        }
    }
    grid
}

/// Terrain that is naturally hard to see into (high ground, dense forest)
/// starts with heavier fog.
fn generate_default_vision(
    dims: &WorldDims,
    elevation: &ScalarGrid,
    forest: &ScalarGrid,
) -> ScalarGrid {
    let mut grid = ScalarGrid::for_dims(dims);
    for x in 0..=dims.rows {
        for y in 0..=dims.cols {
            let terrain_part = (elevation.get(x, y) + 0.1 + 0.2).clamp(0.2, 1.0);
            let forest_part = if forest.get(x, y) > 0.6 { 0.8 } else { 0.0 };
            grid.set(x, y, 0.35 + terrain_part + forest_part);
        }
    }
    grid
}

/// Rejection-samples city sites. The spacing requirement relaxes after a
/// bounded number of consecutive rejections so that placement terminates
/// even on cramped maps.
fn place_cities(
    dims: &WorldDims,
    elevation: &ScalarGrid,
    forest: &ScalarGrid,
    count: usize,
    rng: &mut StdRng,
) -> Vec<Vec2> {
    let mut sites: Vec<Vec2> = Vec::with_capacity(count);
    let mut spacing = CITY_SPACING_CELLS;
    let mut tries = 0u32;

    loop {
        let cx = rng.gen_range(0..=dims.rows);
        let cy = rng.gen_range(0..=dims.cols);
        let elev = elevation.get(cx, cy);
        let pos = Vec2::new(cx as f32 * dims.cell_size, cy as f32 * dims.cell_size);

        let in_band =
            elev > TerrainKind::Plains.threshold() && elev < TerrainKind::Hill.threshold();
        let spaced = sites.iter().all(|c| {
            (pos.x - c.x).abs() + (pos.y - c.y).abs() >= dims.cell_size * spacing as f32
        });
        let off_edge = cx >= CITY_EDGE_MARGIN
            && cx <= dims.rows - CITY_EDGE_MARGIN
            && cy >= CITY_EDGE_MARGIN
            && cy <= dims.cols - CITY_EDGE_MARGIN;
        let clear_of_forest = forest.get(cx, cy) < TerrainKind::Forest.threshold();

        if in_band && spaced && off_edge && clear_of_forest {
            sites.push(pos);
            spacing = CITY_SPACING_CELLS;
        }
        if sites.len() >= count {
            return sites;
        }
        tries += 1;
        if tries >= CITY_PLACE_TRIES {
            spacing = (spacing - 1).max(1);
            tries = 0;
        }
    }
}

fn extremal(sites: &[Vec2], mut key: impl FnMut(Vec2) -> f32, take_max: bool) -> usize {
    let mut best = 0;
    let mut best_key = key(sites[0]);
    for (i, &site) in sites.iter().enumerate().skip(1) {
        let k = key(site);
        if (take_max && k > best_key) || (!take_max && k < best_key) {
            best = i;
            best_key = k;
        }
    }
    best
}

/// Picks one start city per player by geometric role (leftmost, rightmost,
/// corners, mid-edges, center) so starts spread around the perimeter.
fn assign_starts(dims: &WorldDims, sites: &[Vec2], players: usize) -> Vec<usize> {
    let half_w = dims.world_w() / 2.0;
    let half_h = dims.world_h() / 2.0;

    let left = extremal(sites, |c| c.x, false);
    let right = extremal(sites, |c| c.x, true);
    let bottom_left = extremal(sites, |c| c.y - c.x, true);
    let top_left = extremal(sites, |c| c.x + c.y, false);
    let top_right = extremal(sites, |c| c.y - c.x, false);
    let bottom_right = extremal(sites, |c| c.x + c.y, true);
    let mid_top = extremal(sites, |c| (c.x - half_w).abs() * 1.5 + c.y, false);
    let mid_bottom = extremal(sites, |c| c.y - (c.x - half_w).abs() * 1.5, true);
    let center = extremal(sites, |c| (c.x - half_w).abs() + (c.y - half_h).abs(), false);

    match players {
        2 => vec![left, right],
        3 => vec![bottom_left, bottom_right, mid_top],
        4 => vec![bottom_left, top_left, top_right, bottom_right],
        5 => vec![bottom_left, top_left, center, top_right, bottom_right],
        6 => vec![
            bottom_left,
            top_left,
            mid_top,
            mid_bottom,
            top_right,
            bottom_right,
        ],
        // Player count is sanitized before generation; this arm is a
        // safety net, not a supported layout.
        _ => (0..players.min(sites.len())).collect(),
    }
}
