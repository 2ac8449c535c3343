//! Validated runtime configuration.
//!
//! Engine timings live in `scoreboard_core::config::EngineConfig`; this module
//! holds the parts only the binary cares about.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

pub use scoreboard_core::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

/// Where raw entities are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store; state is lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
