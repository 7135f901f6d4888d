//! Standalone server binary.
//!
//! Usage:
//!   cargo run -p dominion_server -- [--addr 127.0.0.1:40000] [--tick-hz 45]
//!                                   [--players 2] [--cities-per-player 5]
//!                                   [--seed 42]
//!
//! The server generates a world, waits until every player slot has a
//! connection, then runs the fixed-timestep simulation and streams each
//! player their filtered view.

use std::env;

use anyhow::Context;
use dominion_server::server::GameServer;
use dominion_shared::config::ServerConfig;
use tracing::{info, warn};

fn parse_args() -> ServerConfig {
    let mut cfg = ServerConfig::default();
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.listen_addr = args[i + 1].clone();
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                cfg.tick_hz = args[i + 1].parse().unwrap_or(cfg.tick_hz);
                i += 2;
            }
            "--players" if i + 1 < args.len() => {
                cfg.players = args[i + 1].parse().unwrap_or(cfg.players);
                i += 2;
            }
            "--cities-per-player" if i + 1 < args.len() => {
                cfg.cities_per_player = args[i + 1].parse().unwrap_or(cfg.cities_per_player);
                i += 2;
            }
            "--seed" if i + 1 < args.len() => {
                cfg.world_seed = args[i + 1].parse().ok();
                i += 2;
            }
            _ => i += 1,
        }
    }
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut cfg = parse_args();
    if cfg.sanitize() {
        warn!(
            players = cfg.players,
            tick_hz = cfg.tick_hz,
            "invalid configuration corrected to defaults"
        );
    }

    info!(
        addr = %cfg.listen_addr,
        tick_hz = cfg.tick_hz,
        players = cfg.players,
        "starting server"
    );

    let server = GameServer::bind(cfg).await.context("create server")?;
    let local = server.local_addr()?;
    info!(%local, "server listening");

    server.run().await
}
