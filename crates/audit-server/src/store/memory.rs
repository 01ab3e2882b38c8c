//! In-memory store adapter.
//!
//! Backs the integration tests and store-less development runs. Keeps
//! the same contract as the Postgres adapter: chronological ordering
//! with insertion-order tiebreak, predicate deletes, and a switchable
//! "unavailable" mode for exercising degraded behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{LogEntry, NewLogEntry};
use crate::store::{LogFilter, LogPage, LogStore, Pagination, PurgePredicate, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    entries: Vec<(u64, LogEntry)>,
    seq: u64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a store outage: every operation fails with
    /// `StoreError::Unavailable` until re-enabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        Ok(())
    }

    /// Insert with an explicit timestamp. Fixture helper for
    /// retention scenarios that need backdated entries.
    pub fn insert_at(&self, entry: NewLogEntry, timestamp: DateTime<Utc>) -> LogEntry {
        let mut inner = self.inner.lock().unwrap();
        inner.seq += 1;
        let seq = inner.seq;
        let entry = LogEntry {
            id: Uuid::new_v4(),
            timestamp,
            service: entry.service,
            user_id: entry.user_id,
            action: entry.action,
            level: entry.level,
            details: entry.details,
        };
        inner.entries.push((seq, entry.clone()));
        entry
    }

    fn matches(filter: &LogFilter, entry: &LogEntry) -> bool {
        if let Some(service) = &filter.service {
            if &entry.service != service {
                return false;
            }
        }
        if let Some(user_id) = &filter.user_id {
            if entry.user_id.as_deref() != Some(user_id.as_str()) {
                return false;
            }
        }
        if let Some(level) = filter.level {
            if entry.level != level {
                return false;
            }
        }
        if let Some(action) = &filter.action {
            if &entry.action != action {
                return false;
            }
        }
        if let Some(from) = filter.from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(until) = filter.until {
            if entry.timestamp >= until {
                return false;
            }
        }
        true
    }
}

#[async_trait::async_trait]
impl LogStore for MemoryStore {
    async fn insert(&self, entry: NewLogEntry) -> StoreResult<LogEntry> {
        self.check_available()?;
        Ok(self.insert_at(entry, Utc::now()))
    }

    async fn find(&self, filter: &LogFilter, page: &Pagination) -> StoreResult<LogPage> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();

        let mut matching: Vec<&(u64, LogEntry)> = inner
            .entries
            .iter()
            .filter(|(_, e)| Self::matches(filter, e))
            .collect();
        matching.sort_by_key(|(seq, e)| (e.timestamp, *seq));

        let filtered = matching.len() as u64;
        let entries = matching
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .map(|(_, e)| e.clone())
            .collect();

        Ok(LogPage {
            entries,
            total: inner.entries.len() as u64,
            filtered,
        })
    }

    async fn delete_where(&self, predicate: &PurgePredicate) -> StoreResult<u64> {
        self.check_available()?;
        let mut inner = self.inner.lock().unwrap();

        let before = inner.entries.len();
        inner.entries.retain(|(_, e)| match predicate {
            PurgePredicate::All => false,
            PurgePredicate::OlderThan(cutoff) => e.timestamp >= *cutoff,
            PurgePredicate::Service(service) => &e.service != service,
        });

        Ok((before - inner.entries.len()) as u64)
    }

    async fn count(&self) -> StoreResult<u64> {
        self.check_available()?;
        Ok(self.inner.lock().unwrap().entries.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogLevel;
    use chrono::Duration;

    fn new_entry(service: &str, action: &str) -> NewLogEntry {
        NewLogEntry {
            service: service.to_string(),
            user_id: None,
            action: action.to_string(),
            level: LogLevel::Info,
            details: None,
        }
    }

    #[tokio::test]
    async fn find_orders_chronologically_with_insertion_tiebreak() {
        let store = MemoryStore::new();
        let t = Utc::now();
        store.insert_at(new_entry("a", "first"), t);
        store.insert_at(new_entry("a", "second"), t);
        store.insert_at(new_entry("a", "earlier"), t - Duration::hours(1));

        let page = store
            .find(
                &LogFilter::default(),
                &Pagination {
                    limit: 10,
                    offset: 0,
                },
            )
            .await
            .unwrap();

        let actions: Vec<&str> = page.entries.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["earlier", "first", "second"]);
    }

    #[tokio::test]
    async fn counts_are_independent_of_pagination() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert(new_entry(if i < 2 { "auth" } else { "billing" }, "x"))
                .await
                .unwrap();
        }

        let page = store
            .find(
                &LogFilter {
                    service: Some("billing".to_string()),
                    ..Default::default()
                },
                &Pagination {
                    limit: 1,
                    offset: 0,
                },
            )
            .await
            .unwrap();

        assert_eq!(page.entries.len(), 1);
        assert_eq!(page.filtered, 3);
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn unavailable_mode_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(store.insert(new_entry("a", "x")).await.is_err());
        assert!(store.count().await.is_err());
        assert!(store.delete_where(&PurgePredicate::All).await.is_err());

        store.set_unavailable(false);
        assert!(store.insert(new_entry("a", "x")).await.is_ok());
    }
}
