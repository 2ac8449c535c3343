//! Configuration module for scoreboard-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{EngineConfig, LogFormat, ServerConfig, StoreConfig};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub log_format: LogFormat,
    /// `false` when the config file was missing and defaults were used.
    pub from_file: bool,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides and validate.
    ///
    /// A missing file is not an error: every setting has a default, and
    /// [`LoadedConfig::from_file`] is `false`. Reporting it is left to the
    /// caller.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let (file_config, from_file) = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => (toml::from_str(&content)?, true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (FileConfig::default(), false),
            Err(e) => return Err(e.into()),
        };
        let mut loaded = self.build(file_config)?;
        loaded.from_file = from_file;
        Ok(loaded)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn build(&self, mut file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        validate(&file_config)?;

        Ok(LoadedConfig {
            server: ServerConfig {
                listen: file_config.server.listen,
            },
            engine: EngineConfig {
                debounce: Duration::from_millis(file_config.engine.debounce_ms),
                retry_interval: Duration::from_millis(file_config.engine.retry_interval_ms),
                max_swap_retries: file_config.engine.max_swap_retries,
            },
            store: StoreConfig {
                backend: file_config.store.backend,
                max_connections: file_config.store.max_connections,
            },
            log_format: file_config.log_format,
            from_file: true,
        })
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.engine.retry_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "engine.retry_interval_ms must be greater than zero".into(),
        ));
    }
    if config.store.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "store.max_connections must be greater than zero".into(),
        ));
    }
    Ok(())
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::StoreBackend;

    #[test]
    fn test_listen_override_wins() {
        let override_addr: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loader = ConfigLoader::new("unused.toml", Some(override_addr));
        let file_config: FileConfig = toml::from_str("[server]\nlisten = \"0.0.0.0:1\"\n").unwrap();
        let loaded = loader.build(file_config).unwrap();
        assert_eq!(loaded.server.listen, override_addr);
        assert_eq!(loaded.store.backend, StoreBackend::Memory);
        assert_eq!(loaded.engine, EngineConfig::default());
    }

    #[test]
    fn test_zero_retry_interval_is_rejected() {
        let loader = ConfigLoader::new("unused.toml", None);
        let file_config: FileConfig = toml::from_str("[engine]\nretry_interval_ms = 0\n").unwrap();
        assert!(matches!(
            loader.build(file_config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loader = ConfigLoader::new("/nonexistent/scoreboard.toml", None);
        let loaded = loader.load().unwrap();
        assert!(!loaded.from_file);
        assert_eq!(loaded.server.listen.port(), 8080);
        assert_eq!(loaded.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_existing_file_is_reported() {
        let path = std::env::temp_dir().join(format!("scoreboard-{}.toml", std::process::id()));
        std::fs::write(&path, "log_format = \"json\"\n").unwrap();
        let loaded = ConfigLoader::new(&path, None).load();
        std::fs::remove_file(&path).unwrap();

        let loaded = loaded.unwrap();
        assert!(loaded.from_file);
        assert_eq!(loaded.log_format, LogFormat::Json);
    }
}
