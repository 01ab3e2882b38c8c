//! Admin authentication — Axum `FromRequestParts` extractor.
//!
//! The purge endpoint requires `Authorization: Bearer <ADMIN_API_KEY>`.
//! Identity (`admin_user`) lives in the request body and is checked by
//! the handler after this gate passes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::AppState;
use audit_common::AppError;

/// Bearer-key gate for admin-only routes.
///
/// Use as a handler parameter to require the admin API key:
/// ```ignore
/// async fn protected(_auth: AdminAuth) -> impl IntoResponse { ... }
/// ```
pub struct AdminAuth;

impl FromRequestParts<std::sync::Arc<AppState>> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &std::sync::Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthenticated("Missing or invalid Authorization header".into())
            })?;

        // Strip "Bearer " prefix
        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthenticated("Missing or invalid Authorization header".into())
        })?;

        if token != state.config.admin_api_key {
            tracing::debug!("admin API key mismatch");
            return Err(AppError::Unauthenticated("Invalid API key".into()));
        }

        Ok(AdminAuth)
    }
}
