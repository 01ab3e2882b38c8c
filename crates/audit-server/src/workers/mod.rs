//! Background workers — periodic tasks running alongside the server.

pub mod retention;

use chrono::NaiveTime;
use tokio::task::JoinHandle;

use crate::purge::PurgeCriteria;
use crate::AppState;

/// Start all background worker tasks. Returns handles that are
/// aborted on shutdown. The purge engine and its fixed criterion are
/// handed to the retention worker explicitly at construction.
pub fn start_all_workers(state: &AppState, purge_at: NaiveTime) -> Vec<JoinHandle<()>> {
    vec![retention::start(
        state.purge.clone(),
        PurgeCriteria::OlderThanDays(state.config.retention_days),
        purge_at,
    )]
}
