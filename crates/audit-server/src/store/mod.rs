//! Store adapter — the only layer touching the backing store.
//!
//! The core consumes a small capability set (insert, filtered find,
//! predicate bulk delete, count) through the [`LogStore`] trait, so a
//! store outage is a value (`StoreError::Unavailable`) rather than a
//! crash, and tests can run against the in-memory adapter.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use chrono::{DateTime, Utc};

use audit_common::AppError;

use crate::model::{LogEntry, LogLevel, NewLogEntry};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure. Anything that prevents reaching the backing
/// store surfaces as `Unavailable`; driver errors never leak past the
/// adapter boundary.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Unavailable(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "store operation failed");
        AppError::StoreUnavailable
    }
}

/// Filter applied to `find`. Unset fields impose no constraint.
/// `until` is exclusive; the query planner converts an inclusive
/// `end_date` into the next midnight.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub service: Option<String>,
    pub user_id: Option<String>,
    pub level: Option<LogLevel>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

/// One page of results plus the counts the response envelope needs.
#[derive(Debug)]
pub struct LogPage {
    /// Entries in ascending (timestamp, insertion order).
    pub entries: Vec<LogEntry>,
    /// Count of all persisted entries, ignoring the filter.
    pub total: u64,
    /// Count of entries matching the filter, before pagination.
    pub filtered: u64,
}

/// Deletion predicate resolved from a purge criterion. Predicate-based
/// bulk deletes are idempotent: re-applying one deletes zero rows and
/// is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum PurgePredicate {
    /// `timestamp` strictly before the cutoff.
    OlderThan(DateTime<Utc>),
    /// Exact match on `service`.
    Service(String),
    /// Every entry.
    All,
}

#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    /// Persist a validated entry, assigning id and UTC timestamp.
    /// Never partially writes.
    async fn insert(&self, entry: NewLogEntry) -> StoreResult<LogEntry>;

    /// Filtered, paginated retrieval in strict chronological order
    /// (ascending timestamp, ties broken by insertion order). Callers
    /// may rely on the ordering without re-sorting.
    async fn find(&self, filter: &LogFilter, page: &Pagination) -> StoreResult<LogPage>;

    /// Bulk delete everything matching the predicate; returns the
    /// number of deleted entries.
    async fn delete_where(&self, predicate: &PurgePredicate) -> StoreResult<u64>;

    /// Total number of persisted entries.
    async fn count(&self) -> StoreResult<u64>;
}
