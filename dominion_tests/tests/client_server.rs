//! Full socket-based integration tests for client ↔ server sessions.

use std::time::Duration;

use dominion_client::GameClient;
use dominion_server::server::bind_ephemeral;
use dominion_shared::{
    math::Vec2,
    net::{ClientMsg, PlayerView, TroopOrder},
};

/// Idles until the player's own troop shows up in a view.
async fn await_own_troop(
    client: &mut GameClient,
    rounds: usize,
) -> anyhow::Result<Option<(PlayerView, usize)>> {
    let me = client.handshake.player_index;
    for _ in 0..rounds {
        let view = client.idle().await?;
        if let Some(i) = view.troops.iter().position(|t| t.owner.0 == me) {
            return Ok(Some((view, i)));
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    Ok(None)
}

/// Full integration: two players connect, handshake, exchange views and
/// commands, and tear down cleanly.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn two_player_session_roundtrip() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();

    let (server, cfg) = bind_ephemeral(2, 64).await?;
    let addr = cfg.listen_addr.clone();
    let server_handle = tokio::spawn(server.run());

    tokio::time::sleep(Duration::from_millis(10)).await;

    // The game holds at the connection gate until both slots are filled.
    let mut first = GameClient::connect(&addr).await?;
    let mut second = GameClient::connect(&addr).await?;

    // Slots race on the shared listener, so the index split is arbitrary
    // but must cover both players exactly once.
    let mut indices = vec![
        first.handshake.player_index,
        second.handshake.player_index,
    ];
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1]);
    assert_eq!(first.handshake.players, 2);
    assert_eq!(first.handshake.cities.len(), cfg.players * cfg.cities_per_player);
    assert_eq!(
        first.handshake.elevation.rows(),
        second.handshake.elevation.rows()
    );

    // Each player should uncover their own starting troop.
    let (view, troop_index) = await_own_troop(&mut first, 100)
        .await?
        .expect("own troop never became visible");
    assert_eq!(view.cities.len(), cfg.players * cfg.cities_per_player);
    let troop = view.troops[troop_index].clone();
    assert!(troop.path.is_empty());

    // Order the troop somewhere far; the path should show up in a later view.
    let target = Vec2::new(troop.position.x + 200.0, troop.position.y);
    first
        .exchange(&ClientMsg::Commands {
            troops: vec![TroopOrder {
                troop: troop.id,
                path: vec![target],
            }],
            cities: vec![],
        })
        .await?;

    let mut ordered_path_seen = false;
    for _ in 0..100 {
        let view = first.idle().await?;
        let mine = view.troops.iter().find(|t| t.id == troop.id);
        if let Some(t) = mine {
            if t.path.first() == Some(&target) {
                ordered_path_seen = true;
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(ordered_path_seen, "troop order never reflected in a view");

    // The second player keeps exchanging unaffected.
    let _ = second.idle().await?;

    // Pause/unpause are acknowledged with further views either way.
    let _ = first.pause().await?;
    let _ = first.unpause().await?;

    first.close().await?;
    second.close().await?;

    server_handle.abort();
    Ok(())
}

/// A session that closes frees the slot; the server keeps serving the
/// remaining player and accepts a reconnect.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slot_reconnects_after_close() -> anyhow::Result<()> {
    let (server, cfg) = bind_ephemeral(2, 64).await?;
    let addr = cfg.listen_addr.clone();
    let server_handle = tokio::spawn(server.run());

    tokio::time::sleep(Duration::from_millis(10)).await;

    let first = GameClient::connect(&addr).await?;
    let mut second = GameClient::connect(&addr).await?;
    let closed_index = first.handshake.player_index;

    first.close().await?;

    // The survivor still gets views.
    let _ = second.idle().await?;

    // The freed slot hands out the same player index again.
    let replacement = GameClient::connect(&addr).await?;
    assert_eq!(replacement.handshake.player_index, closed_index);

    let _ = second.idle().await?;
    second.close().await?;

    server_handle.abort();
    Ok(())
}
