//! Configuration system.
//!
//! Loads server configuration from JSON strings/files (file IO left to the
//! binary). Operator-facing knobs only; simulation tuning constants live
//! with the simulation.

use serde::{Deserialize, Serialize};

/// Supported player counts.
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

/// Root server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `127.0.0.1:40000`.
    pub listen_addr: String,
    /// Fixed simulation tick rate.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    /// Number of player slots.
    #[serde(default = "default_players")]
    pub players: usize,
    /// Cities generated per player (world size scales with this).
    #[serde(default = "default_cities_per_player")]
    pub cities_per_player: usize,
    /// World generation seed; `None` draws one from entropy.
    #[serde(default)]
    pub world_seed: Option<u64>,
}

fn default_tick_hz() -> u32 {
    45
}

fn default_players() -> usize {
    MIN_PLAYERS
}

fn default_cities_per_player() -> usize {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:40000".to_string(),
            tick_hz: default_tick_hz(),
            players: default_players(),
            cities_per_player: default_cities_per_player(),
            world_seed: None,
        }
    }
}

impl ServerConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Corrects invalid values to safe defaults instead of failing startup.
    /// Returns `true` if anything was changed.
    pub fn sanitize(&mut self) -> bool {
        let mut changed = false;
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            self.players = default_players();
            changed = true;
        }
        if self.tick_hz == 0 {
            self.tick_hz = default_tick_hz();
            changed = true;
        }
        if self.cities_per_player == 0 {
            self.cities_per_player = default_cities_per_player();
            changed = true;
        }
        changed
    }
}
