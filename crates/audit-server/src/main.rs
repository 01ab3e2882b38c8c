//! # Audit trail server
//!
//! REST API for centralized audit logging: ingestion, filtered
//! retrieval, and retention purging (manual + scheduled).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveTime;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use audit_server::store::PostgresStore;
use audit_server::{api, workers, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting audit trail server...");

    // Load configuration
    let config = audit_common::AppConfig::load().context("Failed to load configuration")?;
    let purge_at = NaiveTime::parse_from_str(&config.purge_time, "%H:%M")
        .with_context(|| format!("Invalid PURGE_TIME '{}': expected HH:MM", config.purge_time))?;

    // Connect to PostgreSQL
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    // Run migrations
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new("./migrations")).await?;
    migrator.run(&db).await?;
    tracing::info!("Database migrations applied");

    // Build shared state
    let store = Arc::new(PostgresStore::new(db));
    let state = Arc::new(AppState::new(store, config.clone()));

    // Start background workers
    let worker_handles = workers::start_all_workers(&state, purge_at);
    tracing::info!("Retention worker scheduled daily at {} UTC", config.purge_time);

    // Build router
    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid HOST/PORT")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Teardown: stop the retention timer with the process
    for handle in worker_handles {
        handle.abort();
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install CTRL+C handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
