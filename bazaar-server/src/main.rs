//! Bazaar node notification server
//!
//! Hosts the node's event bus and notifier, and streams client messages
//! over a websocket.

mod api;
mod config;
mod delivery;
mod server;
mod shutdown;
mod state;

use bazaar_core::events::EventBus;
use bazaar_core::framework::{MemoryStore, NotificationStore, PgNotificationStore};
use bazaar_core::processors::Notifier;
use clap::Parser;
use config::file::StoreBackend;
use config::{ConfigLoader, get_database_url};
use server::{build_router, run_server};
use shutdown::shutdown_and_notify;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Bazaar notification server - event bus, notifier and client websocket
#[derive(Parser, Debug)]
#[command(name = "bazaar-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./bazaar-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:4002)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup (postgres backend only)
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting bazaar-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Open the notification store
    let (store, db_pool): (Arc<dyn NotificationStore>, Option<PgPool>) = match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory notification store");
            (Arc::new(MemoryStore::new()), None)
        }
        StoreBackend::Postgres => {
            let pool = connect_database(config.max_connections, args.migrate).await?;
            (Arc::new(PgNotificationStore::new(pool.clone())), Some(pool))
        }
    };

    // Wire the bus, delivery sink and notifier
    let bus = EventBus::new();
    let (deliveries_tx, _) = broadcast::channel(config.broadcast_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let notifier = Notifier::new(
        bus.clone(),
        Arc::clone(&store),
        delivery::broadcast_sink(deliveries_tx.clone()),
    );
    let notifier_handle = tokio::spawn(notifier.run(shutdown_rx));

    // Create application state and router
    let state = AppState::new(store, deliveries_tx);
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", config.listen);
    let result = run_server(router, config.listen, shutdown_and_notify(shutdown_tx)).await;

    // The shutdown sender is gone by now, which also stops the notifier
    if let Err(e) = notifier_handle.await {
        tracing::error!(error = %e, "Notifier task failed");
    }

    if let Some(pool) = db_pool {
        tracing::info!("Closing database connections...");
        pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Connect to `DATABASE_URL`, optionally running migrations.
async fn connect_database(max_connections: u32, migrate: bool) -> anyhow::Result<PgPool> {
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    if migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    Ok(pool)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,bazaar_core=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
