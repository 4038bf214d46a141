use axum::Json;
use serde_json::Value as JsonValue;

/// GET /
pub async fn root() -> Json<JsonValue> {
    Json(serde_json::json!({ "message": "Chess Analysis API" }))
}

/// GET /health
pub async fn health_check() -> Json<JsonValue> {
    Json(serde_json::json!({ "status": "ok" }))
}
