use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

/// Handler for `GET /healthz`, the liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz`, the readiness check.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /api/health`, the JSON status check polled by the mobile clients.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
