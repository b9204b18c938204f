use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Handle GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "ball-costing",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
