//! WebSocket hosting for bughouse rooms.
//!
//! ## Core Types
//!
//! - [`Casino`] — Process-wide registry of rooms by id
//! - [`Router`] — Decodes frames from one connection and applies them to its room
//! - [`Session`] — Per-connection state
//! - [`Server`] — actix-web bootstrap serving the WebSocket endpoint
//! - [`Config`] — Command line and environment settings
mod casino;
#[cfg(feature = "server")]
mod config;
mod router;
#[cfg(feature = "server")]
mod server;

pub use casino::*;
#[cfg(feature = "server")]
pub use config::*;
pub use router::*;
#[cfg(feature = "server")]
pub use server::*;
