//! Purge engine — criterion validation, predicate construction, and
//! execution for both the manual endpoint and the daily scheduler.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use audit_common::AppError;

use crate::store::{LogStore, PurgePredicate, StoreError};

/// A recognized purge criterion. Exactly one shape; anything
/// ambiguous, empty, or unrecognized is rejected before the store is
/// touched.
#[derive(Debug, Clone, PartialEq)]
pub enum PurgeCriteria {
    OlderThanDays(i64),
    Service(String),
    DeleteAll,
}

impl PurgeCriteria {
    /// Resolve to a deletion predicate against the given clock.
    ///
    /// Total for any positive day count: a cutoff beyond chrono's
    /// representable range saturates at the minimum instant, so the
    /// predicate matches nothing instead of panicking inside the
    /// detached purge task or the scheduler loop.
    pub fn to_predicate(&self, now: DateTime<Utc>) -> PurgePredicate {
        match self {
            Self::OlderThanDays(days) => {
                let cutoff = Duration::try_days(*days)
                    .and_then(|d| now.checked_sub_signed(d))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                PurgePredicate::OlderThan(cutoff)
            }
            Self::Service(service) => PurgePredicate::Service(service.clone()),
            Self::DeleteAll => PurgePredicate::All,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::OlderThanDays(days) => format!("logs older than {days} days"),
            Self::Service(service) => format!("logs from service '{service}'"),
            Self::DeleteAll => "all logs".to_string(),
        }
    }
}

/// Raw criteria object as received on POST /purge-logs. Unknown keys
/// are captured so "empty" and "unrecognized" get distinct messages.
#[derive(Debug, Default, Deserialize)]
pub struct CriteriaBody {
    pub delete_all: Option<bool>,
    pub older_than_days: Option<i64>,
    pub service: Option<String>,
    #[serde(flatten)]
    pub unknown: serde_json::Map<String, serde_json::Value>,
}

impl TryFrom<CriteriaBody> for PurgeCriteria {
    type Error = AppError;

    fn try_from(body: CriteriaBody) -> Result<Self, Self::Error> {
        let mut recognized = Vec::new();
        if body.delete_all.is_some() {
            recognized.push("delete_all");
        }
        if body.older_than_days.is_some() {
            recognized.push("older_than_days");
        }
        if body.service.is_some() {
            recognized.push("service");
        }

        match recognized.len() {
            0 if body.unknown.is_empty() => {
                return Err(AppError::Validation("Missing purge criteria".to_string()))
            }
            0 => {
                return Err(AppError::Validation(
                    "Invalid purge criteria. Must specify one of: delete_all, older_than_days, service"
                        .to_string(),
                ))
            }
            1 => {}
            _ => {
                return Err(AppError::Validation(format!(
                    "Ambiguous purge criteria: specify exactly one of {}",
                    recognized.join(", ")
                )))
            }
        }

        if let Some(delete_all) = body.delete_all {
            if !delete_all {
                return Err(AppError::Validation(
                    "delete_all must be true when specified".to_string(),
                ));
            }
            return Ok(Self::DeleteAll);
        }
        if let Some(days) = body.older_than_days {
            if days <= 0 {
                return Err(AppError::Validation(
                    "older_than_days must be a positive integer".to_string(),
                ));
            }
            return Ok(Self::OlderThanDays(days));
        }
        if let Some(service) = body.service {
            if service.trim().is_empty() {
                return Err(AppError::Validation(
                    "service must be a non-empty string".to_string(),
                ));
            }
            return Ok(Self::Service(service));
        }

        unreachable!("exactly one criteria field was checked above")
    }
}

/// Who asked for the purge. Only used for logging the outcome.
#[derive(Debug, Clone)]
pub enum PurgeInitiator {
    Manual { admin_user: String },
    Scheduled,
}

/// Executes purges against the store. Cheap to clone; the manual path
/// clones it into a detached task so the 202 response never waits on
/// deletion.
#[derive(Clone)]
pub struct PurgeEngine {
    store: Arc<dyn LogStore>,
}

impl PurgeEngine {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Resolve the criterion at execution time and bulk-delete.
    ///
    /// Idempotent: re-running the same criterion deletes zero entries
    /// and succeeds. Overlapping concurrent purges are safe for the
    /// same reason; each only removes entries matching its own
    /// predicate.
    pub async fn execute(
        &self,
        criteria: &PurgeCriteria,
        initiator: &PurgeInitiator,
    ) -> Result<u64, StoreError> {
        let predicate = criteria.to_predicate(Utc::now());
        let deleted = self.store.delete_where(&predicate).await?;

        match initiator {
            PurgeInitiator::Manual { admin_user } => {
                tracing::info!(
                    deleted,
                    admin_user = %admin_user,
                    criteria = %criteria.describe(),
                    "manual purge completed"
                );
            }
            PurgeInitiator::Scheduled => {
                tracing::info!(
                    deleted,
                    criteria = %criteria.describe(),
                    "scheduled purge completed"
                );
            }
        }

        Ok(deleted)
    }
}
