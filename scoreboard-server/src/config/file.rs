//! TOML file configuration structures.
//!
//! These structs directly map to the `scoreboard.toml` file format. Every
//! section is optional.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};

use super::runtime::{EngineConfig, LogFormat, StoreBackend};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub store: StoreSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Recomputation timing. Reloaded on SIGHUP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_max_swap_retries")]
    pub max_swap_retries: u32,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            max_swap_retries: default_max_swap_retries(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    EngineConfig::DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_retry_interval_ms() -> u64 {
    EngineConfig::DEFAULT_RETRY_INTERVAL.as_millis() as u64
}

fn default_max_swap_retries() -> u32 {
    EngineConfig::DEFAULT_MAX_SWAP_RETRIES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Pool size for the postgres backend.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}
