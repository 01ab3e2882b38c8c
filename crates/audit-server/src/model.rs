//! Log entry model and ingestion validation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use audit_common::AppError;

/// Severity of a recorded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            _ => Err(()),
        }
    }
}

/// A persisted audit entry. Write-once: deletion through the purge
/// engine is the only mutation.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub user_id: Option<String>,
    pub action: String,
    pub level: LogLevel,
    pub details: Option<String>,
}

/// A validated entry awaiting insertion. The store assigns `id` and
/// `timestamp`.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub service: String,
    pub user_id: Option<String>,
    pub action: String,
    pub level: LogLevel,
    pub details: Option<String>,
}

/// Raw ingestion payload as received on POST /log. All fields optional
/// so validation can report every problem at once instead of failing on
/// the first missing field.
#[derive(Debug, Deserialize)]
pub struct LogPayload {
    pub service: Option<String>,
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub level: Option<String>,
    pub details: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Validate an ingestion payload into a [`NewLogEntry`].
///
/// Required: `service`, `action`, `level` (one of INFO, WARNING,
/// ERROR). Every missing or invalid field is named in a single
/// combined message. No side effects.
pub fn validate_entry(payload: LogPayload) -> Result<NewLogEntry, AppError> {
    let mut problems = Vec::new();

    let service = non_empty(payload.service);
    if service.is_none() {
        problems.push("service is required".to_string());
    }

    let action = non_empty(payload.action);
    if action.is_none() {
        problems.push("action is required".to_string());
    }

    let level = match non_empty(payload.level) {
        None => {
            problems.push("level is required".to_string());
            None
        }
        Some(raw) => match raw.parse::<LogLevel>() {
            Ok(level) => Some(level),
            Err(()) => {
                problems.push(format!(
                    "level '{raw}' is invalid: must be one of INFO, WARNING, ERROR"
                ));
                None
            }
        },
    };

    if !problems.is_empty() {
        return Err(AppError::Validation(format!(
            "Invalid log entry: {}",
            problems.join("; ")
        )));
    }

    Ok(NewLogEntry {
        // unwraps guarded by the problems check above
        service: service.unwrap(),
        user_id: non_empty(payload.user_id),
        action: action.unwrap(),
        level: level.unwrap(),
        details: payload.details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(service: &str, action: &str, level: &str) -> LogPayload {
        LogPayload {
            service: Some(service.to_string()),
            user_id: None,
            action: Some(action.to_string()),
            level: Some(level.to_string()),
            details: None,
        }
    }

    #[test]
    fn valid_entry_passes() {
        let entry = validate_entry(payload("Auth", "login", "INFO")).unwrap();
        assert_eq!(entry.service, "Auth");
        assert_eq!(entry.level, LogLevel::Info);
    }

    #[test]
    fn all_missing_fields_are_named_together() {
        let err = validate_entry(LogPayload {
            service: None,
            user_id: None,
            action: None,
            level: None,
            details: None,
        })
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("service"), "{msg}");
        assert!(msg.contains("action"), "{msg}");
        assert!(msg.contains("level"), "{msg}");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let err = validate_entry(payload("  ", "login", "INFO")).unwrap_err();
        assert!(err.to_string().contains("service is required"));
    }

    #[test]
    fn unrecognized_level_is_rejected() {
        let err = validate_entry(payload("Auth", "login", "DEBUG")).unwrap_err();
        assert!(err.to_string().contains("DEBUG"));
        assert!(err.to_string().contains("INFO, WARNING, ERROR"));
    }

    #[test]
    fn optional_user_id_is_normalized() {
        let mut p = payload("Auth", "login", "INFO");
        p.user_id = Some("".to_string());
        let entry = validate_entry(p).unwrap();
        assert_eq!(entry.user_id, None);
    }
}
