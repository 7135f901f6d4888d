//! `dominion_server`
//!
//! The authoritative simulation server. Owns all world/player/city/troop
//! state; connection handlers only queue commands and read published views,
//! and the tick loop is the sole mutator.

pub mod connection;
pub mod consts;
pub mod field;
pub mod server;
pub mod sim;
pub mod worldgen;
