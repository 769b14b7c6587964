//! Room engine for live bughouse sessions.
//!
//! A room seats four connections in a fixed role order, checks whose turn it
//! is on each board, relays plays and chat, and routes captures to partners.
//!
//! ## Core Types
//!
//! - [`Room`] — Seat assignment, per-board turn state, and action handling
//! - [`Table`] — Seat slots and fan-out to the connections still holding them
//! - [`Client`] — Non-blocking outbound handle to one connection
//! - [`Role`] — Fixed (team, board, color) tuple handed out by join order
//!
//! ## Wire Format
//!
//! - [`Protocol`] — Decodes client frames into [`ClientMessage`]
//! - [`ServerMessage`] — Frames sent back to clients
mod client;
mod message;
mod protocol;
mod role;
mod room;
mod table;

pub use client::*;
pub use message::*;
pub use protocol::*;
pub use role::*;
pub use room::*;
pub use table::*;
