//! Client implementation.
//!
//! The exchange is strict request/response from the client's point of view:
//! the server sends the latest view first, then waits for exactly one
//! message before sending again. `exchange` models one such round.

use anyhow::Context;
use tokio::net::TcpStream;
use tracing::info;

use dominion_shared::net::{ClientMsg, FramedConn, Handshake, PlayerView};

/// High-level protocol client.
pub struct GameClient {
    conn: FramedConn,
    /// Terrain snapshot received on connect.
    pub handshake: Handshake,
    /// Most recent view returned by `exchange`.
    pub last_view: Option<PlayerView>,
}

impl GameClient {
    /// Connects to a server and receives the terrain handshake.
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("tcp connect {addr}"))?;
        let mut conn = FramedConn::new(stream);

        let handshake: Handshake = conn.recv_msg().await.context("receive handshake")?;
        info!(
            player = handshake.player_index,
            players = handshake.players,
            cities = handshake.cities.len(),
            "connected"
        );

        Ok(Self {
            conn,
            handshake,
            last_view: None,
        })
    }

    /// One protocol round: receive the latest view, then answer with `msg`.
    pub async fn exchange(&mut self, msg: &ClientMsg) -> anyhow::Result<PlayerView> {
        let view: PlayerView = self.conn.recv_msg().await.context("receive view")?;
        self.conn.send_msg(msg).await.context("send message")?;
        self.last_view = Some(view.clone());
        Ok(view)
    }

    /// An idle round carrying no orders.
    pub async fn idle(&mut self) -> anyhow::Result<PlayerView> {
        self.exchange(&ClientMsg::empty_commands()).await
    }

    pub async fn pause(&mut self) -> anyhow::Result<PlayerView> {
        self.exchange(&ClientMsg::Pause).await
    }

    pub async fn unpause(&mut self) -> anyhow::Result<PlayerView> {
        self.exchange(&ClientMsg::Unpause).await
    }

    /// Ends the session: takes the pending view, then tells the server to
    /// tear this connection down.
    pub async fn close(mut self) -> anyhow::Result<()> {
        let _: PlayerView = self.conn.recv_msg().await.context("receive final view")?;
        self.conn.send_msg(&ClientMsg::Close).await.context("send close")
    }
}
