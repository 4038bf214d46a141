use axum::{extract::Query, Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::db::players;
use crate::error::AppError;

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    pub prefix: Option<String>,
}

/// GET /api/players/suggestions?prefix=
pub async fn get_suggestions(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<SuggestionsQuery>,
) -> Result<Json<JsonValue>, AppError> {
    let prefix = q.prefix.unwrap_or_default();
    let names = players::suggest_players(&pool, &prefix).await?;
    Ok(Json(serde_json::json!({ "suggestions": names })))
}
