//! Scoreboard Server
//!
//! Live tournament state and leaderboard engine: admin mutations in,
//! consistent standings and live match notifications out.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::runtime::{LogFormat, StoreBackend, StoreConfig};
use config::{ConfigLoader, get_database_url};
use scoreboard_core::config::ConfigStore;
use scoreboard_core::store::{MemoryStore, PgStore, SharedStore};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Scoreboard - live tournament standings server
#[derive(Parser, Debug)]
#[command(name = "scoreboard-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./scoreboard.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup (postgres backend only)
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration; logging depends on it
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load()?;

    init_tracing(loaded_config.log_format);
    tracing::info!("Starting scoreboard-server v{}", env!("CARGO_PKG_VERSION"));
    if loaded_config.from_file {
        tracing::info!("Configuration loaded from {:?}", config_loader.config_path());
    } else {
        tracing::warn!(path = ?config_loader.config_path(), "Config file not found, using defaults");
    }

    let listen_addr = loaded_config.server.listen;
    let engine_config = ConfigStore::new(loaded_config.engine);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (store, db_pool, mut tasks) =
        open_store(loaded_config.store, args.migrate, shutdown_rx.clone()).await?;

    // Create application state and spawn the engine
    let (state, engine_tasks) = AppState::start(store, engine_config.clone(), shutdown_rx.clone());
    tasks.extend(engine_tasks);

    // Spawn config reload handler (listens for SIGHUP)
    tasks.push(spawn_config_reload_handler(
        config_loader,
        engine_config,
        shutdown_rx,
    ));

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr, shutdown_tx.clone()).await;

    // Stop processors even if the server failed to start
    let _ = shutdown_tx.send(true);
    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Background task panicked");
        }
    }

    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Open the configured entity store.
///
/// For postgres this also starts the NOTIFY relay, whose handle is returned
/// alongside the pool.
async fn open_store(
    config: StoreConfig,
    migrate: bool,
    shutdown_rx: watch::Receiver<bool>,
) -> anyhow::Result<(SharedStore, Option<PgPool>, Vec<JoinHandle<()>>)> {
    match config.backend {
        StoreBackend::Memory => {
            if migrate {
                tracing::warn!("--migrate has no effect with the memory store");
            }
            tracing::info!("Using in-memory entity store");
            Ok((Arc::new(MemoryStore::new()), None, Vec::new()))
        }
        StoreBackend::Postgres => {
            // Get database URL from environment
            let database_url = get_database_url().map_err(|e| {
                tracing::error!("DATABASE_URL environment variable not set");
                e
            })?;

            // Create database connection pool
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(&database_url)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to database: {}", e);
                    e
                })?;
            tracing::info!("Database connection established");

            // Run migrations if requested
            if migrate {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("../migrations")
                    .run(&db_pool)
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to run migrations: {}", e);
                        e
                    })?;
                tracing::info!("Migrations completed successfully");
            }

            let store = PgStore::new(db_pool.clone());
            let relay = store.spawn_listener(shutdown_rx);
            Ok((Arc::new(store), Some(db_pool), vec![relay]))
        }
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}
