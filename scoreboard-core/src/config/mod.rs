//! Runtime settings for the engine.
//!
//! These types are the validated form of the configuration. Loading and
//! parsing the config file is handled by the server crate.

mod config_store;
mod engine;

pub use config_store::{ConfigStore, ConfigWatcher};
pub use engine::EngineConfig;
