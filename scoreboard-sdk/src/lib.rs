//! Shared types for the Scoreboard tournament engine.
//!
//! - [`objects`]: the published schema (stats, leaderboard), match views,
//!   admin request bodies and the WebSocket protocol.
//! - [`sync`]: per-subscriber diff state used to derive live notifications.
//! - `client` (feature `client`): HTTP and WebSocket clients.

pub mod objects;
pub mod sync;

#[cfg(feature = "client")]
pub mod client;
