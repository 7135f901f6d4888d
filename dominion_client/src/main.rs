//! Headless observer binary.
//!
//! Connects to a running server, idles through a few exchanges while
//! logging what the assigned player can see, then closes. Handy for
//! checking a server without a rendering client.

use std::env;

use anyhow::Context;
use dominion_client::GameClient;
use tracing::info;

fn parse_addr() -> String {
    let args: Vec<String> = env::args().collect();
    let mut addr = "127.0.0.1:40000".to_string();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--addr" && i + 1 < args.len() {
            addr = args[i + 1].clone();
            i += 2;
        } else {
            i += 1;
        }
    }
    addr
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let addr = parse_addr();
    let mut client = GameClient::connect(&addr).await.context("connect")?;
    info!(
        rows = client.handshake.elevation.rows(),
        cols = client.handshake.elevation.cols(),
        "terrain received"
    );

    for round in 0..10 {
        let view = client.idle().await?;
        let owned = view
            .cities
            .iter()
            .filter(|c| c.owner.map(|o| o.0) == Some(client.handshake.player_index))
            .count();
        info!(
            round,
            visible_troops = view.troops.len(),
            owned_cities = owned,
            "view"
        );
    }

    client.close().await
}
