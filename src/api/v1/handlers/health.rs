/*
 * Responsibility
 * - GET /health (疎通用)
 * - store には触れない: lookup の失敗は Deny になるだけで、プロセスは生きている
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
