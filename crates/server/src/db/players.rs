use sqlx::PgPool;

use crate::error::AppError;

/// Shortest prefix that produces suggestions.
pub const MIN_SUGGESTION_PREFIX: usize = 2;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
}

/// "  magnus   CARLSEN " -> "Magnus Carlsen"
pub fn normalize_player_name(name: &str) -> String {
    name.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Find a player by case-insensitive name, creating it if missing.
pub async fn get_or_create_player(pool: &PgPool, name: &str) -> Result<Player, AppError> {
    let normalized = normalize_player_name(name);
    if normalized.is_empty() {
        return Err(AppError::BadRequest("Player name must not be empty".into()));
    }

    sqlx::query("INSERT INTO players (name) VALUES ($1) ON CONFLICT DO NOTHING")
        .bind(&normalized)
        .execute(pool)
        .await
        .map_err(AppError::Sqlx)?;

    sqlx::query_as::<_, Player>("SELECT id, name FROM players WHERE LOWER(name) = LOWER($1)")
        .bind(&normalized)
        .fetch_one(pool)
        .await
        .map_err(AppError::Sqlx)
}

/// Player names starting with `prefix`, case-insensitively, ordered by name.
pub async fn suggest_players(pool: &PgPool, prefix: &str) -> Result<Vec<String>, AppError> {
    let prefix = prefix.trim();
    if prefix.chars().count() < MIN_SUGGESTION_PREFIX {
        return Ok(Vec::new());
    }

    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM players WHERE LOWER(name) LIKE $1 || '%' ESCAPE '\\' ORDER BY name",
    )
    .bind(escape_like(&prefix.to_lowercase()))
    .fetch_all(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
