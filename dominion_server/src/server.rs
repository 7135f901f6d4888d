//! Server implementation.
//!
//! An authoritative fixed-timestep loop over the simulation engine:
//! - generate the world once at startup
//! - one slot task per player for accept/handshake/exchange
//! - a single tick loop that drains queued commands, advances the
//!   simulation, and republishes per-player views
//!
//! The tick loop is the sole owner and mutator of simulation state. It
//! holds the target tick rate with absolute deadlines and skips entirely
//! (sleeping) only while every player is paused.

use std::sync::{atomic::Ordering, Arc};

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    net::TcpListener,
    sync::Barrier,
    time::{sleep, sleep_until, Duration, Instant},
};
use tracing::info;

use dominion_shared::{config::ServerConfig, net::PlayerId};

use crate::{
    connection::{run_slot, PlayerSlot, SlotContext},
    sim::{CommandBatch, Simulation},
    worldgen,
};

/// How often the loop reports tick throughput.
const REPORT_INTERVAL: Duration = Duration::from_secs(30);
/// Sleep while every player is paused.
const PAUSED_POLL: Duration = Duration::from_millis(100);

/// Game server: listener, simulation, and per-player slots.
pub struct GameServer {
    cfg: ServerConfig,
    listener: Arc<TcpListener>,
    sim: Simulation,
    slots: Vec<Arc<PlayerSlot>>,
    start_gate: Arc<Barrier>,
    tick: u64,
}

impl GameServer {
    /// Binds the listener and generates the world. Failure to bind is the
    /// only fatal startup condition.
    pub async fn bind(cfg: ServerConfig) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&cfg.listen_addr)
            .await
            .with_context(|| format!("tcp bind {}", cfg.listen_addr))?;

        let map = worldgen::generate(cfg.players, cfg.cities_per_player, cfg.world_seed);
        let dims = map.world.dims;
        let sim_rng = match cfg.world_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let sim = Simulation::new(map, cfg.tick_hz, sim_rng);

        let slots = (0..cfg.players)
            .map(|_| {
                Arc::new(PlayerSlot::new(PlayerSlot::blank_view(
                    dims.rows, dims.cols,
                )))
            })
            .collect();

        Ok(Self {
            start_gate: Arc::new(Barrier::new(cfg.players + 1)),
            cfg,
            listener: Arc::new(listener),
            sim,
            slots,
            tick: 0,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Runs the server forever: spawns slot tasks, waits for every player
    /// to connect, then drives the tick loop.
    pub async fn run(mut self) -> anyhow::Result<()> {
        for (index, slot) in self.slots.iter().enumerate() {
            tokio::spawn(run_slot(SlotContext {
                index,
                listener: Arc::clone(&self.listener),
                slot: Arc::clone(slot),
                handshake: self.sim.handshake_for(index),
                start_gate: Arc::clone(&self.start_gate),
            }));
        }

        info!(players = self.cfg.players, "waiting for all players");
        self.start_gate.wait().await;
        info!("all players connected, starting game");

        let dt = Duration::from_secs_f32(1.0 / self.cfg.tick_hz as f32);
        let mut next = Instant::now() + dt;
        let mut last_report = Instant::now();
        let mut ticks_since_report = 0u64;

        loop {
            if !self.any_unpaused() {
                sleep(PAUSED_POLL).await;
                next = Instant::now() + dt;
                continue;
            }

            self.step().await;
            ticks_since_report += 1;

            if last_report.elapsed() >= REPORT_INTERVAL {
                let rate = ticks_since_report as f64 / last_report.elapsed().as_secs_f64();
                info!(tick = self.tick, rate, "tick loop");
                last_report = Instant::now();
                ticks_since_report = 0;
            }

            sleep_until(next).await;
            next += dt;
        }
    }

    /// Advances exactly `ticks` simulation steps at the configured rate,
    /// without waiting for connections. Used by tests and tools.
    pub async fn run_for_ticks(&mut self, ticks: u64) -> anyhow::Result<()> {
        let dt = Duration::from_secs_f32(1.0 / self.cfg.tick_hz as f32);
        let mut next = Instant::now();
        for _ in 0..ticks {
            next += dt;
            self.step().await;
            sleep_until(next).await;
        }
        Ok(())
    }

    fn any_unpaused(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.unpaused.load(Ordering::SeqCst))
    }

    /// One tick: drain queues, simulate, publish views.
    async fn step(&mut self) {
        let batch = self.drain_commands().await;
        self.sim.tick(batch);
        for (p, slot) in self.slots.iter().enumerate() {
            *slot.view.write().await = self.sim.view_for(PlayerId(p));
        }
        self.tick += 1;
    }

    async fn drain_commands(&self) -> CommandBatch {
        let mut batch = CommandBatch::default();
        for slot in &self.slots {
            let mut queue = slot.commands.lock().await;
            batch.troops.append(&mut queue.troops);
            batch.cities.append(&mut queue.cities);
        }
        batch
    }
}

/// Helper for tests: bind to an ephemeral port with a fixed world seed.
pub async fn bind_ephemeral(players: usize, tick_hz: u32) -> anyhow::Result<(GameServer, ServerConfig)> {
    let mut cfg = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        tick_hz,
        players,
        cities_per_player: 3,
        world_seed: Some(7),
    };
    let server = GameServer::bind(cfg.clone()).await?;
    cfg.listen_addr = server.local_addr()?.to_string();
    Ok((server, cfg))
}
