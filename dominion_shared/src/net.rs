//! Wire protocol.
//!
//! Goals:
//! - One reliable framed channel per player over TCP.
//! - Exchanges are strict request/response: the server sends the latest view,
//!   then waits for exactly one client message before sending again.
//! - Keep serialization explicit and replaceable (payloads are JSON today).
//!
//! Framing: a fixed-width ASCII decimal length header, right-padded with
//! spaces, followed by exactly that many payload bytes.

use anyhow::Context;
use bytes::{BufMut, Bytes, BytesMut};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

use crate::{grid::ScalarGrid, math::Vec2};

/// Width of the ASCII length header in bytes.
pub const FRAME_HEADER_LEN: usize = 64;

/// Stable troop identity, assigned at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TroopId(pub u64);

/// Stable city identity, assigned at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityId(pub u64);

/// Index into the fixed player list. Entities refer to their owner through
/// this handle, never through an owning reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

/// One-time server → client message sent right after accept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Handshake {
    pub elevation: ScalarGrid,
    pub forest: ScalarGrid,
    pub cities: Vec<Vec2>,
    pub players: usize,
    pub player_index: usize,
}

/// A troop as seen by one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TroopView {
    pub id: TroopId,
    pub position: Vec2,
    pub owner: PlayerId,
    pub path: Vec<Vec2>,
    pub health: f32,
    pub attacking: bool,
}

/// A city as seen by one player. Cities are always listed; only troops are
/// fogged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityView {
    pub id: CityId,
    pub position: Vec2,
    pub path: Vec<Vec2>,
    pub owner: Option<PlayerId>,
}

/// Per-tick server → client snapshot, filtered for one player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerView {
    pub vision: ScalarGrid,
    pub border: ScalarGrid,
    pub troops: Vec<TroopView>,
    pub cities: Vec<CityView>,
}

/// Replaces a troop's waypoint queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TroopOrder {
    pub troop: TroopId,
    pub path: Vec<Vec2>,
}

/// Replaces a city's rally path (inherited by troops it produces).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityOrder {
    pub city: CityId,
    pub path: Vec<Vec2>,
}

/// Client → server message; exactly one per exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClientMsg {
    Pause,
    Unpause,
    Close,
    Commands {
        troops: Vec<TroopOrder>,
        cities: Vec<CityOrder>,
    },
}

impl ClientMsg {
    /// A command batch carrying no orders (the idle exchange).
    pub fn empty_commands() -> Self {
        ClientMsg::Commands {
            troops: Vec::new(),
            cities: Vec::new(),
        }
    }
}

/// Reliable connection over TCP with space-padded ASCII length framing.
#[derive(Debug)]
pub struct FramedConn {
    stream: TcpStream,
}

impl FramedConn {
    pub fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    pub async fn send_msg<T: Serialize>(&mut self, msg: &T) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(msg).context("serialize msg")?;
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_LEN + payload.len());
        buf.put_slice(&frame_header(payload.len()));
        buf.extend_from_slice(&payload);
        self.stream.write_all(&buf).await.context("tcp write")?;
        Ok(())
    }

    /// Reads one raw frame. Transport failures surface here; decoding is the
    /// caller's concern so that malformed payloads can be handled separately
    /// from dead sockets.
    pub async fn recv_frame(&mut self) -> anyhow::Result<Vec<u8>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        self.stream
            .read_exact(&mut header)
            .await
            .context("tcp read frame header")?;
        let text = std::str::from_utf8(&header).context("frame header not ascii")?;
        let len: usize = text.trim().parse().context("parse frame length")?;
        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .await
            .context("tcp read frame payload")?;
        Ok(payload)
    }

    pub async fn recv_msg<T: DeserializeOwned>(&mut self) -> anyhow::Result<T> {
        let payload = self.recv_frame().await?;
        decode_from_bytes(&payload)
    }

    pub fn peer_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.stream.peer_addr()?)
    }
}

/// Builds the fixed-width length header for a payload.
pub fn frame_header(payload_len: usize) -> [u8; FRAME_HEADER_LEN] {
    let mut header = [b' '; FRAME_HEADER_LEN];
    let digits = payload_len.to_string();
    header[..digits.len()].copy_from_slice(digits.as_bytes());
    header
}

/// Convenience codec helpers.
pub fn encode_to_bytes<T: Serialize>(msg: &T) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes<T: DeserializeOwned>(b: &[u8]) -> anyhow::Result<T> {
    serde_json::from_slice(b).context("deserialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn client_msg_roundtrip_bytes() {
        let msg = ClientMsg::Commands {
            troops: vec![TroopOrder {
                troop: TroopId(7),
                path: vec![Vec2::new(1.0, 2.0)],
            }],
            cities: vec![CityOrder {
                city: CityId(3),
                path: vec![],
            }],
        };
        let bytes = encode_to_bytes(&msg).unwrap();
        let back: ClientMsg = decode_from_bytes(&bytes).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn frame_header_is_space_padded_ascii() {
        let header = frame_header(1234);
        assert_eq!(&header[..4], b"1234");
        assert!(header[4..].iter().all(|&b| b == b' '));
        assert_eq!(header.len(), FRAME_HEADER_LEN);
    }

    #[tokio::test]
    async fn framed_conn_roundtrip_over_socket() -> anyhow::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            let mut conn = FramedConn::new(stream);
            let msg: ClientMsg = conn.recv_msg().await?;
            conn.send_msg(&msg).await?;
            Ok::<_, anyhow::Error>(())
        });

        let stream = TcpStream::connect(addr).await?;
        let mut conn = FramedConn::new(stream);
        conn.send_msg(&ClientMsg::Pause).await?;
        let echoed: ClientMsg = conn.recv_msg().await?;
        assert_eq!(echoed, ClientMsg::Pause);

        server.await??;
        Ok(())
    }
}
