//! Per-player connection handling.
//!
//! One task per player slot, all sharing the listener. A slot task loops
//! forever: accept, send the terrain handshake, then run the session
//! exchange (send latest view, receive exactly one message). Close or a
//! socket error tears the connection down and the slot goes back to
//! accepting, so a player can reconnect into their slot; other slots and
//! the tick loop are unaffected.
//!
//! Slot tasks never touch simulation state. They append to the slot's
//! command queue and read the slot's published view; the tick loop is the
//! only drainer and the only publisher.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::{
    net::TcpListener,
    sync::{Barrier, Mutex, RwLock},
    time::{sleep, Duration},
};
use tracing::{info, warn};

use dominion_shared::{
    grid::ScalarGrid,
    net::{decode_from_bytes, ClientMsg, FramedConn, Handshake, PlayerView},
};

use crate::sim::CommandBatch;

/// Cross-task state for one player slot.
pub struct PlayerSlot {
    /// Commands queued since the last tick; drained only by the tick loop.
    pub commands: Mutex<CommandBatch>,
    /// The tick loop runs while at least one slot is unpaused.
    pub unpaused: AtomicBool,
    /// Latest published snapshot for this player.
    pub view: RwLock<PlayerView>,
}

impl PlayerSlot {
    pub fn new(initial_view: PlayerView) -> Self {
        Self {
            commands: Mutex::new(CommandBatch::default()),
            unpaused: AtomicBool::new(false),
            view: RwLock::new(initial_view),
        }
    }

    /// Pre-game placeholder view with correctly shaped, all-zero fields.
    pub fn blank_view(rows: usize, cols: usize) -> PlayerView {
        PlayerView {
            vision: ScalarGrid::zeros(rows, cols),
            border: ScalarGrid::zeros(rows, cols),
            troops: Vec::new(),
            cities: Vec::new(),
        }
    }
}

/// Everything a slot task needs.
pub struct SlotContext {
    pub index: usize,
    pub listener: Arc<TcpListener>,
    pub slot: Arc<PlayerSlot>,
    pub handshake: Handshake,
    /// Released once every slot has completed its first handshake.
    pub start_gate: Arc<Barrier>,
}

/// Accept/session loop for one player slot. Runs for the server's lifetime.
pub async fn run_slot(ctx: SlotContext) {
    let mut announced = false;
    loop {
        ctx.slot.unpaused.store(false, Ordering::SeqCst);
        info!(player = ctx.index, "waiting for connection");

        let (stream, addr) = match ctx.listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(player = ctx.index, error = %e, "accept failed");
                sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!(player = ctx.index, %addr, "player connected");

        let mut conn = FramedConn::new(stream);
        match session(&ctx, &mut conn, &mut announced).await {
            Ok(()) => info!(player = ctx.index, "player left"),
            Err(e) => warn!(player = ctx.index, error = %e, "connection lost"),
        }
    }
}

/// One connected session: handshake, then the view/command exchange until
/// the client closes or the socket dies.
async fn session(
    ctx: &SlotContext,
    conn: &mut FramedConn,
    announced: &mut bool,
) -> anyhow::Result<()> {
    conn.send_msg(&ctx.handshake).await?;

    // First session on this slot holds the game back until every slot has a
    // player; reconnects join the running game directly.
    if !*announced {
        *announced = true;
        ctx.start_gate.wait().await;
    }
    ctx.slot.unpaused.store(true, Ordering::SeqCst);

    loop {
        let view = ctx.slot.view.read().await.clone();
        conn.send_msg(&view).await?;

        let frame = conn.recv_frame().await?;
        let msg = match decode_from_bytes::<ClientMsg>(&frame) {
            Ok(msg) => msg,
            Err(e) => {
                // A garbled payload is not a dead socket; carry on with an
                // empty command batch.
                warn!(player = ctx.index, error = %e, "undecodable message, treating as empty");
                ClientMsg::empty_commands()
            }
        };

        match msg {
            ClientMsg::Pause => ctx.slot.unpaused.store(false, Ordering::SeqCst),
            ClientMsg::Unpause => ctx.slot.unpaused.store(true, Ordering::SeqCst),
            ClientMsg::Close => return Ok(()),
            ClientMsg::Commands { troops, cities } => {
                let mut queue = ctx.slot.commands.lock().await;
                queue.troops.extend(troops);
                queue.cities.extend(cities);
            }
        }
    }
}
