//! API routes module.

pub mod extract;
mod health;
mod logs;
pub mod middleware;
mod purge;

use crate::AppState;
use axum::Router;
use std::sync::Arc;

/// Build the full router: ingestion, retrieval, purge, health.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(logs::router(state.clone()))
        .merge(purge::router(state))
        .merge(health::router())
}
