//! Log ingestion and retrieval — POST /log and GET /logs.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::extract::{Json, Query};
use crate::model::{validate_entry, LogEntry, LogLevel, LogPayload};
use crate::store::{LogFilter, Pagination};
use crate::AppState;
use audit_common::{AppError, AppResult};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/log", post(create_log))
        .route("/logs", get(list_logs))
        .with_state(state)
}

// ─── Types ───────────────────────────────────────────────────

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

/// Raw query parameters for GET /logs. Dates arrive as strings and are
/// converted with fail-fast validation before the store is consulted.
#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    service: Option<String>,
    user_id: Option<String>,
    level: Option<String>,
    action: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Serialize)]
struct LogsEnvelope {
    logs: Vec<LogEntry>,
    total: u64,
    filtered: u64,
    /// Always true: the page is in ascending timestamp order.
    chronological_order: bool,
}

// ─── Query planning ──────────────────────────────────────────

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!(
            "Invalid {field} '{value}': expected YYYY-MM-DD"
        ))
    })
}

/// Translate raw request parameters into a store filter.
pub fn plan_filter(query: &LogsQuery) -> Result<LogFilter, AppError> {
    let level = match &query.level {
        None => None,
        Some(raw) => Some(LogLevel::from_str(raw).map_err(|_| {
            AppError::Validation(format!(
                "Invalid level '{raw}': must be one of INFO, WARNING, ERROR"
            ))
        })?),
    };

    let from = match &query.start_date {
        None => None,
        Some(raw) => {
            let date = parse_date("start_date", raw)?;
            Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
        }
    };

    // inclusive end date becomes an exclusive next-midnight bound
    let until = match &query.end_date {
        None => None,
        Some(raw) => {
            let date = parse_date("end_date", raw)? + chrono::Duration::days(1);
            Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
        }
    };

    Ok(LogFilter {
        service: query.service.clone(),
        user_id: query.user_id.clone(),
        level,
        action: query.action.clone(),
        from,
        until,
    })
}

/// Clamp pagination into a sane, bounded range.
pub fn plan_pagination(query: &LogsQuery) -> Pagination {
    Pagination {
        limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset: query.offset.unwrap_or(0).max(0),
    }
}

// ─── Handlers ────────────────────────────────────────────────

async fn create_log(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LogPayload>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let entry = validate_entry(payload)?;
    let stored = state.store.insert(entry).await?;

    tracing::debug!(id = %stored.id, service = %stored.service, "log entry recorded");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "success", "id": stored.id })),
    ))
}

async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> AppResult<Json<LogsEnvelope>> {
    let filter = plan_filter(&query)?;
    let pagination = plan_pagination(&query);

    let page = state.store.find(&filter, &pagination).await?;

    Ok(Json(LogsEnvelope {
        logs: page.entries,
        total: page.total,
        filtered: page.filtered,
        chronological_order: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_start_date_names_field_and_format() {
        let query = LogsQuery {
            start_date: Some("11/08/2025".to_string()),
            ..Default::default()
        };
        let err = plan_filter(&query).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("start_date"), "{msg}");
        assert!(msg.contains("YYYY-MM-DD"), "{msg}");
    }

    #[test]
    fn end_date_is_inclusive() {
        let query = LogsQuery {
            start_date: Some("2025-01-01".to_string()),
            end_date: Some("2025-01-31".to_string()),
            ..Default::default()
        };
        let filter = plan_filter(&query).unwrap();
        assert_eq!(
            filter.from.unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
        // entries on the 31st itself still match
        assert_eq!(
            filter.until.unwrap(),
            Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn unrecognized_level_filter_is_rejected() {
        let query = LogsQuery {
            level: Some("TRACE".to_string()),
            ..Default::default()
        };
        assert!(plan_filter(&query).is_err());
    }

    #[test]
    fn pagination_is_clamped_never_ignored() {
        let p = plan_pagination(&LogsQuery::default());
        assert_eq!((p.limit, p.offset), (100, 0));

        let p = plan_pagination(&LogsQuery {
            limit: Some(50_000),
            offset: Some(-5),
            ..Default::default()
        });
        assert_eq!((p.limit, p.offset), (1000, 0));

        let p = plan_pagination(&LogsQuery {
            limit: Some(0),
            ..Default::default()
        });
        assert_eq!(p.limit, 1);
    }
}
