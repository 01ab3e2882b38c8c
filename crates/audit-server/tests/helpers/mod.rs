//! Shared test helpers for integration tests.
//!
//! Tests run the real router against the in-memory store adapter, so
//! no database is required and outages can be simulated.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use audit_common::AppConfig;
use audit_server::store::{LogStore, MemoryStore};
use audit_server::{api, AppState};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct handle on the backing store for fixtures and assertions
    pub store: Arc<MemoryStore>,
    /// Application config (defaults: admin key `secret-admin-key`,
    /// admin user `admin@company.com`)
    pub config: AppConfig,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = AppConfig::default();
        let state = Arc::new(AppState::new(store.clone(), config.clone()));

        Self {
            router: api::router(state),
            store,
            config,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }

    /// Ingest an entry through the API; panics on anything but 201.
    pub async fn ingest(&self, service: &str, action: &str, level: &str) -> TestResponse {
        let response = self
            .request(
                "POST",
                "/log",
                Some(serde_json::json!({
                    "service": service,
                    "action": action,
                    "level": level,
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response
    }

    /// Seed an entry `age_days` in the past, bypassing the API clock.
    pub fn seed_aged(&self, service: &str, action: &str, age_days: i64) {
        self.store.insert_at(
            audit_server::model::NewLogEntry {
                service: service.to_string(),
                user_id: None,
                action: action.to_string(),
                level: audit_server::model::LogLevel::Info,
                details: None,
            },
            chrono::Utc::now() - chrono::Duration::days(age_days),
        );
    }

    /// Issue a purge as the default admin with the given criteria.
    pub async fn purge(&self, criteria: Value) -> TestResponse {
        self.request(
            "POST",
            "/purge-logs",
            Some(serde_json::json!({
                "admin_user": self.config.admin_users[0],
                "criteria": criteria,
            })),
            Some(&self.config.admin_api_key),
        )
        .await
    }

    /// Wait for the fire-and-forget purge task to bring the store to
    /// the expected entry count.
    pub async fn wait_for_count(&self, expected: u64) {
        for _ in 0..100 {
            if self.store.count().await.unwrap() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "store never reached {expected} entries (at {})",
            self.store.count().await.unwrap()
        );
    }
}
