//! `dominion_client`
//!
//! A thin headless client for the server protocol: connect, receive the
//! terrain handshake, then exchange views for commands in lockstep. Used by
//! bots and integration tests; rendering and input capture live elsewhere.

pub mod client;
pub mod orders;

pub use client::GameClient;
