//! Evenly Backend Service
//!
//! Main entry point for the Evenly bill-splitting backend.
//! This service provides:
//! - JSON REST API for users, friends, groups, expenses and payments
//! - Credit score computation from payment history

use anyhow::Context;
use evenly_backend::config::{AppConfig, StoreBackend};
use evenly_backend::database::{create_pool, ensure_schema, Database};
use evenly_backend::store::{MemoryStore, PgRowStore, RowStore, TableNames};
use evenly_backend::{routes, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("Configuration error")?;

    init_tracing(&config);

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Evenly Backend Service Starting                ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    info!("Table prefix: {:?}", config.store.table_prefix);

    // =========================================================================
    // STORE SETUP
    // =========================================================================
    let names = TableNames::new(config.store.clone());

    let store: Arc<dyn RowStore> = match (&config.store_backend, &config.database) {
        (StoreBackend::Postgres, Some(database)) => {
            info!("Connecting to database...");
            let pool = create_pool(database)
                .await
                .context("Failed to create database pool")?;

            let database_handle = Database::new(pool);
            database_handle
                .ping()
                .await
                .context("Database is not reachable")?;
            info!("Database connection pool created successfully");
            info!("Max connections: {}", database.max_connections);

            let pool = database_handle.into_pool();
            info!("Ensuring schema...");
            ensure_schema(&pool, &names)
                .await
                .context("Schema bootstrap failed")?;
            info!("✓ Schema ready");

            Arc::new(PgRowStore::new(pool))
        }
        (StoreBackend::Postgres, None) => {
            anyhow::bail!("Postgres store selected without database configuration")
        }
        (StoreBackend::Memory, _) => {
            if config.is_production() {
                warn!("In-memory store in production: data will not survive a restart");
            }
            info!("Using in-memory store");
            Arc::new(MemoryStore::with_schema(&names))
        }
    };

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let state = AppState::new(store, &names);
    info!("✓ Application state initialized with services");

    let app = routes::router(state);

    // =========================================================================
    // START SERVER
    // =========================================================================
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .context("Invalid HTTP address")?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", addr))?;

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Evenly Backend Service Ready!                  ║");
    info!("╠══════════════════════════════════════════════════════════╣");
    info!("║  HTTP API:     {}", addr);
    info!("║  Environment:  {}", config.environment);
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Evenly Backend Service stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "evenly_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    if config.is_development() {
        info!("Development mode: set LOG_LEVEL=debug for request details");
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal, stopping gracefully..."),
        Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
    }
}
