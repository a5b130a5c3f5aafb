//! `arena_client`
//!
//! Client-side systems:
//! - WebSocket session (join on open, per-frame input, snapshot intake)
//! - Input capture and `GameAction` generation
//! - Snapshot buffering and render-delay selection
//! - World-to-screen translation centered on the local player
//! - Console commands standing in for keyboard and mouse

pub mod client;
pub mod console;
pub mod input;
pub mod interp;
pub mod view;
pub mod ws;

pub use client::GameClient;
pub use ws::WsSession;
