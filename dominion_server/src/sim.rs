//! Simulation engine.
//!
//! Owns all match state (world, players, cities, troops) and advances it one
//! tick at a time. A tick runs three phases in a fixed order:
//!
//! 1. Field reset: every player's vision grid is rebuilt from the world
//!    baseline and city brushes; city border claims are re-marked.
//! 2. Troop update: healing, movement, collision, combat, field marking and
//!    city occupancy, per player in order.
//! 3. City update: ownership transfer from occupancy and troop production.
//!
//! The engine is synchronous and single-writer; queued commands are handed
//! in as a `CommandBatch` drained by the caller once per tick.

use std::collections::{HashMap, VecDeque};

use rand::{rngs::StdRng, Rng};
use tracing::debug;

use dominion_shared::{
    grid::ScalarGrid,
    math::Vec2,
    net::{
        CityId, CityOrder, CityView, Handshake, PlayerId, PlayerView, TroopId, TroopOrder,
        TroopView,
    },
    terrain::TerrainKind,
};

use crate::{
    consts::{
        ALLY_SPACING, ATTACK_DIVISOR, ATTACK_RANGE, BASE_STEP, BORDER_BRUSH_STRENGTH,
        BORDER_HEALING_MOD, CITY_BORDER_RADIUS, CITY_CAPTURE_RADIUS, CITY_VISION_RADIUS,
        ENEMY_SPACING, HEALING_DIVISOR, HEAL_DIST_FULL, HEAL_DIST_PENALTY_MIN, HEAL_DIST_START,
        NO_CITY_HEALING, PRODUCTION_INTERVAL_SECS, SPAWN_JITTER, TROOPS_PER_CITY_CAP,
        TROOP_BORDER_RADIUS, TROOP_MAX_HEALTH, TROOP_VISION_RADIUS, VISIBILITY_THRESHOLD,
    },
    field::Brush,
    worldgen::{GeneratedMap, World},
};

/// A produced or starting unit. Owner is fixed for the troop's lifetime.
#[derive(Debug, Clone)]
pub struct Troop {
    pub id: TroopId,
    pub position: Vec2,
    pub owner: PlayerId,
    pub path: VecDeque<Vec2>,
    pub health: f32,
    pub attacking: bool,
}

/// Cities are never destroyed, only re-owned.
#[derive(Debug, Clone)]
pub struct City {
    pub id: CityId,
    pub position: Vec2,
    pub timer: u32,
    pub owner: Option<PlayerId>,
    pub path: Vec<Vec2>,
}

/// Per-player state: the owning side of the entity graph.
#[derive(Debug, Clone)]
pub struct Player {
    pub start: Vec2,
    pub troops: Vec<Troop>,
    pub vision: ScalarGrid,
    pub border: ScalarGrid,
}

/// Commands collected from all connections since the previous tick.
#[derive(Debug, Clone, Default)]
pub struct CommandBatch {
    pub troops: Vec<TroopOrder>,
    pub cities: Vec<CityOrder>,
}

impl CommandBatch {
    pub fn is_empty(&self) -> bool {
        self.troops.is_empty() && self.cities.is_empty()
    }
}

/// An opposing troop inside attack range, recorded during movement.
#[derive(Debug, Clone, Copy)]
struct EnemyContact {
    player: usize,
    index: usize,
    dist: f32,
}

/// Authoritative match state.
pub struct Simulation {
    world: World,
    cities: Vec<City>,
    players: Vec<Player>,
    /// Players with at least one troop in each city's capture radius this
    /// tick. Rebuilt by the troop phase, consumed by the city phase.
    occupants: Vec<Vec<PlayerId>>,
    next_troop_id: u64,
    next_city_id: u64,
    tick_hz: u32,
    rng: StdRng,

    vision_brush: Brush,
    city_vision_brush: Brush,
    border_brush: Brush,
    city_border_brush: Brush,
}

impl Simulation {
    pub fn new(map: GeneratedMap, tick_hz: u32, rng: StdRng) -> Self {
        let GeneratedMap {
            world,
            city_sites,
            start_sites,
        } = map;

        let mut sim = Simulation {
            cities: Vec::with_capacity(city_sites.len()),
            players: Vec::new(),
            occupants: vec![Vec::new(); city_sites.len()],
            next_troop_id: 0,
            next_city_id: 0,
            tick_hz,
            rng,
            vision_brush: Brush::new(TROOP_VISION_RADIUS, 1.0, 0.0),
            city_vision_brush: Brush::new(CITY_VISION_RADIUS, 1.0, 0.0),
            border_brush: Brush::new(TROOP_BORDER_RADIUS, BORDER_BRUSH_STRENGTH, 0.0),
            city_border_brush: Brush::new(CITY_BORDER_RADIUS, BORDER_BRUSH_STRENGTH, 0.0),
            world,
        };

        for site in city_sites {
            let id = CityId(sim.next_city_id);
            sim.next_city_id += 1;
            sim.cities.push(City {
                id,
                position: site,
                timer: 0,
                owner: None,
                path: Vec::new(),
            });
        }

        for (p, &city_index) in start_sites.iter().enumerate() {
            let owner = PlayerId(p);
            let start = sim.cities[city_index].position;
            sim.cities[city_index].owner = Some(owner);
            let first_troop = sim.new_troop(start, owner, VecDeque::new());
            sim.players.push(Player {
                start,
                troops: vec![first_troop],
                vision: sim.world.default_vision.clone(),
                border: ScalarGrid::for_dims(&sim.world.dims),
            });
        }

        sim
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Advances the match by one tick.
    pub fn tick(&mut self, batch: CommandBatch) {
        // First order per entity wins within a tick.
        let mut troop_orders: HashMap<TroopId, VecDeque<Vec2>> = HashMap::new();
        for order in batch.troops {
            troop_orders
                .entry(order.troop)
                .or_insert(VecDeque::from(order.path));
        }
        let mut city_orders: HashMap<CityId, Vec<Vec2>> = HashMap::new();
        for order in batch.cities {
            city_orders.entry(order.city).or_insert(order.path);
        }

        self.reset_fields();
        self.update_troops(&mut troop_orders);
        self.update_cities(&mut city_orders);

        // Orders addressed to entities that died or never existed are
        // dropped; stale references are expected traffic, not errors.
        if !troop_orders.is_empty() || !city_orders.is_empty() {
            debug!(
                troops = troop_orders.len(),
                cities = city_orders.len(),
                "dropped orders for unknown entities"
            );
        }
    }

    /// Phase 1: rebuild vision from the baseline and re-mark city borders.
    /// Own-city marks go down first so that enemy territory overwrites
    /// friendly marking where city radii overlap.
    fn reset_fields(&mut self) {
        let dims = self.world.dims;
        for p in 0..self.players.len() {
            self.players[p].vision.copy_from(&self.world.default_vision);
            for ci in 0..self.cities.len() {
                if self.cities[ci].owner != Some(PlayerId(p)) {
                    continue;
                }
                let pos = self.cities[ci].position;
                self.city_vision_brush
                    .apply(&mut self.players[p].vision, &dims, pos, 0.0);
                self.city_border_brush
                    .apply(&mut self.players[p].border, &dims, pos, 1.0);
            }
            for ci in 0..self.cities.len() {
                match self.cities[ci].owner {
                    Some(other) if other != PlayerId(p) => {
                        let pos = self.cities[ci].position;
                        self.city_border_brush
                            .apply(&mut self.players[p].border, &dims, pos, 0.0);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Phase 2: per-player troop pass.
    fn update_troops(&mut self, orders: &mut HashMap<TroopId, VecDeque<Vec2>>) {
        self.occupants = vec![Vec::new(); self.cities.len()];
        for p in 0..self.players.len() {
            // Troops that ran out of health leave the field before anything
            // else happens to them.
            self.players[p].troops.retain(|t| t.health > 0.0);
            for i in 0..self.players[p].troops.len() {
                if let Some(path) = orders.remove(&self.players[p].troops[i].id) {
                    self.players[p].troops[i].path = path;
                }
                self.update_troop(p, i);
            }
        }
    }

    fn update_troop(&mut self, p: usize, i: usize) {
        let old_pos = self.players[p].troops[i].position;

        let healing = self.healing_power(p, old_pos);
        {
            let troop = &mut self.players[p].troops[i];
            troop.health = (troop.health + healing / HEALING_DIVISOR).clamp(0.0, TROOP_MAX_HEALTH);
        }

        // Step length comes from the terrain under the troop before it moves.
        let step = self.world.terrain_at(old_pos).speed_mult() * BASE_STEP;
        let mut new_pos = old_pos;
        if let Some(&target) = self.players[p].troops[i].path.front() {
            new_pos = old_pos + (target - old_pos).with_len(step);
        }

        new_pos = self.avoid_allies(p, i, new_pos);

        // Terrain for the movement commit and for combat is resolved at the
        // proposed position, before enemy push-out.
        let on_terrain = self.world.terrain_at(new_pos);
        let (proposed, contacts) = self.enemy_interactions(p, old_pos, new_pos);

        if on_terrain.passable() && self.world.dims.contains(proposed) {
            self.players[p].troops[i].position = proposed;
        }

        {
            let troop = &mut self.players[p].troops[i];
            if let Some(&target) = troop.path.front() {
                if troop.position.distance(target) < step * 2.0 {
                    troop.path.pop_front();
                }
            }
        }

        self.resolve_combat(p, i, on_terrain, &contacts);
        self.mark_fields(p, i, on_terrain);
        self.record_occupancy(p, i);
    }

    /// Healing power at a position: positive near an undisputed own city,
    /// shrinking with distance and with enemy border claim along the supply
    /// line, and a fixed chip loss for a player holding no city at all.
    fn healing_power(&self, p: usize, pos: Vec2) -> f32 {
        let owned: Vec<Vec2> = self
            .cities
            .iter()
            .filter(|c| c.owner == Some(PlayerId(p)))
            .map(|c| c.position)
            .collect();
        let Some(&city) = owned
            .iter()
            .min_by(|a, b| a.distance(pos).total_cmp(&b.distance(pos)))
        else {
            return NO_CITY_HEALING;
        };

        let to_troop = pos - city;
        let dist = to_troop.len();
        let cell = self.world.dims.cell_size;

        // Sample every opposing border along the city->troop line at
        // one-cell increments.
        let steps = (dist / cell) as usize;
        let stride = to_troop.with_len(cell);
        let mut enemy_avgs = Vec::with_capacity(self.players.len() - 1);
        for (op, other) in self.players.iter().enumerate() {
            if op == p {
                continue;
            }
            let mut sum = 0.0;
            for k in 0..=steps {
                let point = city + stride * k as f32;
                sum += other.border.sample(point.x / cell, point.y / cell);
            }
            enemy_avgs.push(sum / (steps + 1) as f32);
        }
        let border_avg = enemy_avgs.iter().sum::<f32>() / enemy_avgs.len().max(1) as f32;

        let dist_penalty = ((dist + HEAL_DIST_START) / HEAL_DIST_FULL).max(HEAL_DIST_PENALTY_MIN);
        (1.0 - border_avg * BORDER_HEALING_MOD) - dist_penalty
    }

    /// Restores spacing from troops of the same player. A waypoint sitting
    /// inside an ally's spacing ring would wedge the troop against it, so
    /// it is skipped while more waypoints remain.
    fn avoid_allies(&mut self, p: usize, i: usize, mut new_pos: Vec2) -> Vec2 {
        for j in 0..self.players[p].troops.len() {
            if j == i {
                continue;
            }
            let ally_pos = self.players[p].troops[j].position;
            let off = new_pos - ally_pos;
            if off.len() < ALLY_SPACING {
                new_pos = ally_pos + off.with_len(ALLY_SPACING);
                let troop = &mut self.players[p].troops[i];
                if troop.path.len() > 1 {
                    if let Some(&target) = troop.path.front() {
                        if target.distance(ally_pos) < ALLY_SPACING {
                            troop.path.pop_front();
                        }
                    }
                }
            }
        }
        new_pos
    }

    /// Erodes opposing border claims at the troop's position, restores
    /// spacing from enemy troops, and records combat candidates.
    fn enemy_interactions(
        &mut self,
        p: usize,
        old_pos: Vec2,
        mut new_pos: Vec2,
    ) -> (Vec2, Vec<EnemyContact>) {
        let dims = self.world.dims;
        let mut contacts = Vec::new();
        for op in 0..self.players.len() {
            if op == p {
                continue;
            }
            self.border_brush
                .apply(&mut self.players[op].border, &dims, old_pos, 0.0);
            for j in 0..self.players[op].troops.len() {
                let enemy_pos = self.players[op].troops[j].position;
                let off = new_pos - enemy_pos;
                let dist = off.len();
                if dist < ENEMY_SPACING {
                    new_pos = enemy_pos + off.with_len(ENEMY_SPACING);
                }
                if dist < ATTACK_RANGE {
                    contacts.push(EnemyContact {
                        player: op,
                        index: j,
                        dist,
                    });
                }
            }
        }
        (new_pos, contacts)
    }

    /// The single nearest candidate takes terrain-scaled damage.
    fn resolve_combat(&mut self, p: usize, i: usize, on_terrain: TerrainKind, contacts: &[EnemyContact]) {
        if let Some(nearest) = contacts.iter().min_by(|a, b| a.dist.total_cmp(&b.dist)) {
            let power = on_terrain.attack_mult() / ATTACK_DIVISOR;
            let enemy = &mut self.players[nearest.player].troops[nearest.index];
            enemy.health = (enemy.health - power).max(0.0);
        }
        self.players[p].troops[i].attacking = !contacts.is_empty();
    }

    /// Clears fog and marks border claim around the troop's final position.
    /// High ground sees as far as a city watchtower.
    fn mark_fields(&mut self, p: usize, i: usize, on_terrain: TerrainKind) {
        let pos = self.players[p].troops[i].position;
        let dims = self.world.dims;
        let vision = if on_terrain == TerrainKind::Hill {
            self.city_vision_brush
        } else {
            self.vision_brush
        };
        vision.apply(&mut self.players[p].vision, &dims, pos, 0.0);
        self.border_brush
            .apply(&mut self.players[p].border, &dims, pos, 1.0);
    }

    fn record_occupancy(&mut self, p: usize, i: usize) {
        let pos = self.players[p].troops[i].position;
        let owner = PlayerId(p);
        for (ci, city) in self.cities.iter().enumerate() {
            if city.position.distance(pos) < CITY_CAPTURE_RADIUS {
                if !self.occupants[ci].contains(&owner) {
                    self.occupants[ci].push(owner);
                }
                break;
            }
        }
    }

    /// Phase 3: ownership transfer and production.
    fn update_cities(&mut self, orders: &mut HashMap<CityId, Vec<Vec2>>) {
        for ci in 0..self.cities.len() {
            if let Some(path) = orders.remove(&self.cities[ci].id) {
                self.cities[ci].path = path;
            }

            let previous = self.cities[ci].owner;
            if self.occupants[ci].len() == 1 {
                self.cities[ci].owner = Some(self.occupants[ci][0]);
            }
            if previous != self.cities[ci].owner {
                self.cities[ci].timer = 0;
                self.cities[ci].path.clear();
            }

            let Some(owner) = self.cities[ci].owner else {
                continue;
            };
            self.cities[ci].timer += 1;

            let troops = self.players[owner.0].troops.len() as f32;
            let owned = self
                .cities
                .iter()
                .filter(|c| c.owner == Some(owner))
                .count() as f32;
            let per_city = troops / owned;
            let due = self.tick_hz as f32 * PRODUCTION_INTERVAL_SECS * per_city.max(1.0);

            if self.cities[ci].timer as f32 >= due && per_city < TROOPS_PER_CITY_CAP {
                let jitter = Vec2::new(
                    self.rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER),
                    self.rng.gen_range(-SPAWN_JITTER..SPAWN_JITTER),
                );
                let spawn_pos = self.cities[ci].position + jitter;
                let path = VecDeque::from(self.cities[ci].path.clone());
                let troop = self.new_troop(spawn_pos, owner, path);
                self.players[owner.0].troops.push(troop);
                self.cities[ci].timer = 0;
            }
        }
    }

    fn new_troop(&mut self, position: Vec2, owner: PlayerId, path: VecDeque<Vec2>) -> Troop {
        let id = TroopId(self.next_troop_id);
        self.next_troop_id += 1;
        Troop {
            id,
            position,
            owner,
            path,
            health: TROOP_MAX_HEALTH,
            attacking: false,
        }
    }

    /// One-time terrain snapshot for a connecting player.
    pub fn handshake_for(&self, player_index: usize) -> Handshake {
        Handshake {
            elevation: self.world.elevation.clone(),
            forest: self.world.forest.clone(),
            cities: self.cities.iter().map(|c| c.position).collect(),
            players: self.players.len(),
            player_index,
        }
    }

    /// Snapshot filtered for one player: their fields, every city, and only
    /// the troops their vision uncovers.
    pub fn view_for(&self, viewer: PlayerId) -> PlayerView {
        let ply = &self.players[viewer.0];
        let cities = self
            .cities
            .iter()
            .map(|c| CityView {
                id: c.id,
                position: c.position,
                path: c.path.clone(),
                owner: c.owner,
            })
            .collect();

        let mut troops = Vec::new();
        for player in &self.players {
            for troop in &player.troops {
                let (gx, gy) = self.world.dims.to_grid(troop.position);
                if ply.vision.sample(gx, gy) < VISIBILITY_THRESHOLD {
                    troops.push(TroopView {
                        id: troop.id,
                        position: troop.position,
                        owner: troop.owner,
                        path: troop.path.iter().copied().collect(),
                        health: troop.health,
                        attacking: troop.attacking,
                    });
                }
            }
        }

        PlayerView {
            vision: ply.vision.clone(),
            border: ply.border.clone(),
            troops,
            cities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dominion_shared::grid::WorldDims;
    use rand::SeedableRng;

    /// Flat all-plains 800x800 map with four city sites; players start at
    /// the first sites in order.
    fn flat_map(players: usize) -> GeneratedMap {
        let dims = WorldDims::new(40, 40, 20.0);
        let mut elevation = ScalarGrid::for_dims(&dims);
        let mut default_vision = ScalarGrid::for_dims(&dims);
        for x in 0..=dims.rows {
            for y in 0..=dims.cols {
                elevation.set(x, y, 0.3);
                default_vision.set(x, y, 1.0);
            }
        }
        GeneratedMap {
            world: World {
                dims,
                elevation,
                forest: ScalarGrid::for_dims(&dims),
                default_vision,
            },
            city_sites: vec![
                Vec2::new(100.0, 100.0),
                Vec2::new(700.0, 700.0),
                Vec2::new(400.0, 100.0),
                Vec2::new(100.0, 700.0),
            ],
            start_sites: (0..players).collect(),
        }
    }

    fn sim(players: usize) -> Simulation {
        Simulation::new(flat_map(players), 45, StdRng::seed_from_u64(1))
    }

    #[test]
    fn troop_heals_next_to_undisputed_own_city() {
        let mut s = sim(2);
        s.players[0].troops[0].health = 50.0;
        s.tick(CommandBatch::default());
        let health = s.players[0].troops[0].health;
        assert!(health > 50.0, "expected healing, got {health}");
    }

    #[test]
    fn troop_without_any_city_takes_chip_damage() {
        let mut s = sim(2);
        s.cities[0].owner = None;
        s.tick(CommandBatch::default());
        let health = s.players[0].troops[0].health;
        assert!(health < 100.0, "expected chip damage, got {health}");
        assert!((health - (100.0 + NO_CITY_HEALING / HEALING_DIVISOR)).abs() < 1e-4);
    }

    #[test]
    fn waypoint_pops_within_two_steps_and_next_becomes_target() {
        let mut s = sim(2);
        let near = Vec2::new(100.2, 100.0);
        let far = Vec2::new(300.0, 100.0);
        s.players[0].troops[0].path = VecDeque::from(vec![near, far]);
        s.tick(CommandBatch::default());
        assert_eq!(s.players[0].troops[0].path.front(), Some(&far));
    }

    #[test]
    fn order_replaces_path_and_troop_moves_toward_it() {
        let mut s = sim(2);
        let id = s.players[0].troops[0].id;
        let batch = CommandBatch {
            troops: vec![TroopOrder {
                troop: id,
                path: vec![Vec2::new(500.0, 100.0)],
            }],
            cities: vec![],
        };
        s.tick(batch);
        let troop = &s.players[0].troops[0];
        assert_eq!(troop.path.front(), Some(&Vec2::new(500.0, 100.0)));
        assert!(troop.position.x > 100.0);
        // Plains step: one base step along +x.
        assert!((troop.position.x - 100.15).abs() < 1e-3);
    }

    #[test]
    fn stale_orders_are_dropped_without_effect() {
        let mut s = sim(2);
        let batch = CommandBatch {
            troops: vec![TroopOrder {
                troop: TroopId(9999),
                path: vec![Vec2::new(0.0, 0.0)],
            }],
            cities: vec![CityOrder {
                city: CityId(9999),
                path: vec![Vec2::new(0.0, 0.0)],
            }],
        };
        s.tick(batch);
        assert!(s.players[0].troops[0].path.is_empty());
        assert!(s.cities.iter().all(|c| c.path.is_empty()));
    }

    #[test]
    fn dead_troops_are_removed_at_their_next_update() {
        let mut s = sim(2);
        s.players[1].troops[0].health = 0.0;
        s.tick(CommandBatch::default());
        assert!(s.players[1].troops.is_empty());
        assert_eq!(s.players[0].troops.len(), 1);
    }

    #[test]
    fn opposing_troops_separate_to_enemy_spacing_and_trade_damage() {
        let mut s = sim(2);
        s.players[0].troops[0].position = Vec2::new(400.0, 400.0);
        s.players[1].troops[0].position = Vec2::new(410.0, 400.0);
        s.tick(CommandBatch::default());

        let a = s.players[0].troops[0].position;
        let b = s.players[1].troops[0].position;
        assert!(
            (a.distance(b) - ENEMY_SPACING).abs() < 1e-3,
            "separation {}",
            a.distance(b)
        );
        assert!(s.players[0].troops[0].attacking);
        assert!(s.players[1].troops[0].attacking);
        assert!(s.players[0].troops[0].health < 100.0);
        assert!(s.players[1].troops[0].health < 100.0);
    }

    #[test]
    fn sole_occupant_captures_city() {
        let mut s = sim(2);
        s.occupants = vec![Vec::new(); s.cities.len()];
        s.occupants[2] = vec![PlayerId(0)];
        s.cities[2].path = vec![Vec2::new(1.0, 1.0)];
        s.update_cities(&mut HashMap::new());
        assert_eq!(s.cities[2].owner, Some(PlayerId(0)));
        // Transfer resets the timer (then this tick's increment lands).
        assert_eq!(s.cities[2].timer, 1);
        assert!(s.cities[2].path.is_empty());
    }

    #[test]
    fn contested_or_empty_city_keeps_its_owner() {
        let mut s = sim(2);
        s.occupants = vec![Vec::new(); s.cities.len()];
        s.occupants[0] = vec![PlayerId(0), PlayerId(1)];
        s.update_cities(&mut HashMap::new());
        assert_eq!(s.cities[0].owner, Some(PlayerId(0)));

        s.occupants[0].clear();
        s.update_cities(&mut HashMap::new());
        assert_eq!(s.cities[0].owner, Some(PlayerId(0)));
    }

    #[test]
    fn due_city_produces_one_troop_and_resets_its_timer() {
        let mut s = sim(2);
        // Ratio is one troop per owned city, so production is due at
        // tick_hz * interval * 1.
        s.cities[0].timer = 45 * 20;
        s.cities[0].path = vec![Vec2::new(300.0, 300.0)];
        s.tick(CommandBatch::default());

        assert_eq!(s.players[0].troops.len(), 2);
        assert_eq!(s.cities[0].timer, 0);
        let spawned = &s.players[0].troops[1];
        assert!(spawned.position.distance(s.cities[0].position) < SPAWN_JITTER * 2.0);
        assert_eq!(spawned.path.front(), Some(&Vec2::new(300.0, 300.0)));
        assert_eq!(spawned.owner, PlayerId(0));
    }

    #[test]
    fn troop_ids_are_unique_across_production() {
        let mut s = sim(2);
        for _ in 0..3 {
            // Force the start city due regardless of the troop ratio.
            s.cities[0].timer = 45 * 20 * 10;
            s.tick(CommandBatch::default());
        }
        let ids: Vec<u64> = s
            .players
            .iter()
            .flat_map(|p| p.troops.iter().map(|t| t.id.0))
            .collect();
        assert_eq!(ids.len(), 5, "expected three spawns on top of two starts");
        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len(), "duplicate troop id");
    }

    #[test]
    fn view_hides_fogged_enemies_and_shows_own_troops() {
        let mut s = sim(2);
        s.tick(CommandBatch::default());
        let view = s.view_for(PlayerId(0));
        let own = s.players[0].troops[0].id;
        let enemy = s.players[1].troops[0].id;
        assert!(view.troops.iter().any(|t| t.id == own));
        assert!(!view.troops.iter().any(|t| t.id == enemy));
        assert_eq!(view.cities.len(), s.cities.len());
        assert_eq!(view.cities[0].owner, Some(PlayerId(0)));
        assert_eq!(view.cities[1].owner, Some(PlayerId(1)));
    }

    #[test]
    fn invariants_hold_over_many_ticks() {
        let mut s = sim(2);
        let a = s.players[0].troops[0].id;
        let b = s.players[1].troops[0].id;
        let batch = CommandBatch {
            troops: vec![
                TroopOrder {
                    troop: a,
                    path: vec![Vec2::new(700.0, 700.0)],
                },
                TroopOrder {
                    troop: b,
                    path: vec![Vec2::new(100.0, 100.0)],
                },
            ],
            cities: vec![],
        };
        s.tick(batch);
        for _ in 0..200 {
            s.tick(CommandBatch::default());
        }
        for player in &s.players {
            assert!(player.vision.iter().all(|v| (0.0..=1.0).contains(&v)));
            assert!(player.border.iter().all(|v| (0.0..=1.0).contains(&v)));
            for troop in &player.troops {
                assert!((0.0..=TROOP_MAX_HEALTH).contains(&troop.health));
            }
        }
    }
}
