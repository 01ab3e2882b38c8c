//! PostgreSQL store adapter.
//!
//! Entries live in the `audit_log` table (see `migrations/`). A
//! `seq BIGSERIAL` column breaks timestamp ties so chronological
//! ordering is stable under concurrent inserts.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::model::{LogEntry, LogLevel, NewLogEntry};
use crate::store::{LogFilter, LogPage, LogStore, Pagination, PurgePredicate, StoreError, StoreResult};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ENTRY_COLUMNS: &str = "id, timestamp, service, user_id, action, level, details";

fn decode_row(row: &PgRow) -> StoreResult<LogEntry> {
    let level: String = row.try_get("level")?;
    // the migration CHECK-constrains `level`, so this cannot fail for
    // rows this service wrote
    let level = LogLevel::from_str(&level)
        .map_err(|_| StoreError::Unavailable(format!("unexpected level value '{level}'")))?;

    Ok(LogEntry {
        id: row.try_get::<Uuid, _>("id")?,
        timestamp: row.try_get::<DateTime<Utc>, _>("timestamp")?,
        service: row.try_get("service")?,
        user_id: row.try_get("user_id")?,
        action: row.try_get("action")?,
        level,
        details: row.try_get("details")?,
    })
}

/// Append `WHERE`/`AND` clauses for every set filter field.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LogFilter) {
    let mut sep = " WHERE ";
    let mut clause = |qb: &mut QueryBuilder<'_, Postgres>| {
        let s = sep;
        sep = " AND ";
        qb.push(s);
    };

    if let Some(service) = &filter.service {
        clause(qb);
        qb.push("service = ").push_bind(service.clone());
    }
    if let Some(user_id) = &filter.user_id {
        clause(qb);
        qb.push("user_id = ").push_bind(user_id.clone());
    }
    if let Some(level) = filter.level {
        clause(qb);
        qb.push("level = ").push_bind(level.as_str());
    }
    if let Some(action) = &filter.action {
        clause(qb);
        qb.push("action = ").push_bind(action.clone());
    }
    if let Some(from) = filter.from {
        clause(qb);
        qb.push("timestamp >= ").push_bind(from);
    }
    if let Some(until) = filter.until {
        clause(qb);
        qb.push("timestamp < ").push_bind(until);
    }
}

#[async_trait::async_trait]
impl LogStore for PostgresStore {
    async fn insert(&self, entry: NewLogEntry) -> StoreResult<LogEntry> {
        let row = sqlx::query(&format!(
            "INSERT INTO audit_log (timestamp, service, user_id, action, level, details) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(Utc::now())
        .bind(&entry.service)
        .bind(&entry.user_id)
        .bind(&entry.action)
        .bind(entry.level.as_str())
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await?;

        decode_row(&row)
    }

    async fn find(&self, filter: &LogFilter, page: &Pagination) -> StoreResult<LogPage> {
        let mut qb = QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM audit_log"));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY timestamp ASC, seq ASC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let entries = rows
            .iter()
            .map(decode_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM audit_log");
        push_filter(&mut count_qb, filter);
        let filtered: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let total = self.count().await?;

        Ok(LogPage {
            entries,
            total,
            filtered: filtered as u64,
        })
    }

    async fn delete_where(&self, predicate: &PurgePredicate) -> StoreResult<u64> {
        let result = match predicate {
            PurgePredicate::All => {
                sqlx::query("DELETE FROM audit_log")
                    .execute(&self.pool)
                    .await?
            }
            PurgePredicate::OlderThan(cutoff) => {
                sqlx::query("DELETE FROM audit_log WHERE timestamp < $1")
                    .bind(cutoff)
                    .execute(&self.pool)
                    .await?
            }
            PurgePredicate::Service(service) => {
                sqlx::query("DELETE FROM audit_log WHERE service = $1")
                    .bind(service)
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn count(&self) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await?;

        Ok(total as u64)
    }
}
