//! Manual purge — POST /purge-logs.
//!
//! Order of checks: bearer key (extractor), then `admin_user`, then
//! criteria shape. On success the response is an immediate 202; the
//! deletion itself runs in a detached task and its outcome is only
//! observable in logs. A large purge must never hold the request open.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::Json;
use crate::api::middleware::AdminAuth;
use crate::purge::{CriteriaBody, PurgeCriteria, PurgeInitiator};
use crate::AppState;
use audit_common::{AppError, AppResult};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/purge-logs", post(purge_logs))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PurgeRequest {
    admin_user: Option<String>,
    criteria: Option<CriteriaBody>,
}

async fn purge_logs(
    _auth: AdminAuth,
    State(state): State<Arc<AppState>>,
    Json(body): Json<PurgeRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let admin_user = body
        .admin_user
        .filter(|u| !u.trim().is_empty())
        .filter(|u| state.config.admin_users.iter().any(|a| a == u))
        .ok_or_else(|| AppError::Unauthorized("Unauthorized user".into()))?;

    let criteria = PurgeCriteria::try_from(body.criteria.unwrap_or_default())?;

    let engine = state.purge.clone();
    let initiator = PurgeInitiator::Manual {
        admin_user: admin_user.clone(),
    };
    tracing::info!(
        admin_user = %admin_user,
        criteria = %criteria.describe(),
        "purge initiated"
    );
    tokio::spawn(async move {
        if let Err(e) = engine.execute(&criteria, &initiator).await {
            tracing::error!(error = %e, "purge failed after acceptance");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "accepted",
            "message": "Purge process initiated"
        })),
    ))
}
