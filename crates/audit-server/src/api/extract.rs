//! Request extractors with JSON error envelopes.
//!
//! Axum's stock `Json`/`Query` rejections are plain text; these
//! wrappers route them through [`AppError`] so a malformed body or a
//! non-numeric pagination parameter gets the same `{"error": ...}`
//! shape as every other failure.

use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use audit_common::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);
