//! # audit-server
//!
//! Centralized audit trail service: services submit structured action
//! records, compliance tooling queries them, and a purge engine removes
//! them under retention policy (on demand or via the daily scheduler).

pub mod api;
pub mod model;
pub mod purge;
pub mod store;
pub mod workers;

use std::sync::Arc;

use audit_common::AppConfig;

use crate::purge::PurgeEngine;
use crate::store::LogStore;

/// Shared application state available to all handlers.
pub struct AppState {
    pub store: Arc<dyn LogStore>,
    pub purge: PurgeEngine,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn LogStore>, config: AppConfig) -> Self {
        Self {
            purge: PurgeEngine::new(store.clone()),
            store,
            config,
        }
    }
}
