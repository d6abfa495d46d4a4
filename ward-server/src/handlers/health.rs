use axum::{extract::State, http::StatusCode, Json};
use error_common::OperationOutcome;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{ApiResult, IntoApiResponse};
use crate::server::WardServer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: u64,
    pub checks: BTreeMap<String, String>,
}

/// Health check handler; 503 when the store is unreachable
pub async fn health_check(State(server): State<WardServer>) -> (StatusCode, Json<HealthResponse>) {
    let store_healthy = server.coordinator.is_healthy().await;
    let store = if server.persistent { "postgres" } else { "memory" };

    let mut checks = BTreeMap::new();
    checks.insert(
        "store".to_string(),
        format!("{store}: {}", if store_healthy { "healthy" } else { "unavailable" }),
    );

    let (status_code, status) = if store_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_seconds(),
        checks,
    };
    (status_code, Json(response))
}

/// Re-read every collection from the store
pub async fn reload_state(State(server): State<WardServer>) -> ApiResult<()> {
    let outcome: OperationOutcome<()> = server.coordinator.reload().await;
    outcome.into_api_response()
}
