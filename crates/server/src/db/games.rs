use std::sync::LazyLock;

use chess_core::pgn::extract_header;
use regex::Regex;
use sqlx::PgPool;

use crate::db::players;
use crate::error::AppError;

pub const DEFAULT_NAME_PREFIX: &str = "ChessGame_";
pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;

static DEFAULT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ChessGame_(\d+)").expect("valid regex"));

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct Game {
    pub id: i64,
    pub name: String,
    pub fen: String,
    pub pgn: String,
    pub white_player_id: Option<i64>,
    pub black_player_id: Option<i64>,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A game as submitted for saving; absent fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewGame {
    pub name: Option<String>,
    pub fen: String,
    pub pgn: Option<String>,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
}

const GAME_COLUMNS: &str = r#"g.id, g.name, g.fen, g.pgn, g.white_player_id, g.black_player_id,
    wp.name AS white_player, bp.name AS black_player, g.created_at, g.updated_at
    FROM games g
    LEFT JOIN players wp ON wp.id = g.white_player_id
    LEFT JOIN players bp ON bp.id = g.black_player_id"#;

/// Empty names and names already in the `ChessGame_` series get a generated one.
pub fn needs_default_name(name: Option<&str>) -> bool {
    match name.map(str::trim) {
        None | Some("") => true,
        Some(n) => n.starts_with(DEFAULT_NAME_PREFIX),
    }
}

/// Next name in the `ChessGame_<n>` series after `last`.
pub fn next_default_name(last: Option<&str>) -> String {
    let n = last
        .and_then(|name| DEFAULT_NAME_RE.captures(name))
        .and_then(|caps| caps[1].parse::<u64>().ok())
        .unwrap_or(0);
    format!("{DEFAULT_NAME_PREFIX}{}", n + 1)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

async fn generate_default_name(pool: &PgPool) -> Result<String, AppError> {
    let last: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM games WHERE name ~ '^ChessGame_[0-9]+' ORDER BY id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(AppError::Sqlx)?;

    Ok(next_default_name(last.as_ref().map(|r| r.0.as_str())))
}

async fn resolve_player(
    pool: &PgPool,
    supplied: Option<&str>,
    pgn: &str,
    header: &str,
) -> Result<Option<i64>, AppError> {
    let name = match non_blank(supplied) {
        Some(name) => Some(name.to_string()),
        None => extract_header(pgn, header),
    };
    match name {
        Some(name) => Ok(Some(players::get_or_create_player(pool, &name).await?.id)),
        None => Ok(None),
    }
}

/// Insert a game, resolving player names and the default name.
pub async fn save_game(pool: &PgPool, game: &NewGame) -> Result<Game, AppError> {
    let name = if needs_default_name(game.name.as_deref()) {
        generate_default_name(pool).await?
    } else {
        game.name.as_deref().unwrap_or_default().trim().to_string()
    };
    let pgn = game.pgn.as_deref().unwrap_or_default();

    let white_id = resolve_player(pool, game.white_player.as_deref(), pgn, "White").await?;
    let black_id = resolve_player(pool, game.black_player.as_deref(), pgn, "Black").await?;

    let (id,): (i64,) = sqlx::query_as(
        r#"INSERT INTO games (name, fen, pgn, white_player_id, black_player_id)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id"#,
    )
    .bind(&name)
    .bind(game.fen.trim())
    .bind(pgn)
    .bind(white_id)
    .bind(black_id)
    .fetch_one(pool)
    .await
    .map_err(AppError::Sqlx)?;

    tracing::info!(id, name = %name, "Game saved");

    get_game(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Game {id} vanished after insert")))
}

/// Newest games first.
pub async fn list_games(pool: &PgPool, skip: Option<i64>, limit: Option<i64>) -> Result<Vec<Game>, AppError> {
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(0, MAX_LIST_LIMIT);

    let query = format!("SELECT {GAME_COLUMNS} ORDER BY g.created_at DESC, g.id DESC OFFSET $1 LIMIT $2");
    sqlx::query_as::<_, Game>(&query)
        .bind(skip)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(AppError::Sqlx)
}

pub async fn get_game(pool: &PgPool, id: i64) -> Result<Option<Game>, AppError> {
    let query = format!("SELECT {GAME_COLUMNS} WHERE g.id = $1");
    sqlx::query_as::<_, Game>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Sqlx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_default_name() {
        assert!(needs_default_name(None));
        assert!(needs_default_name(Some("")));
        assert!(needs_default_name(Some("   ")));
        assert!(needs_default_name(Some("ChessGame_7")));
        assert!(needs_default_name(Some("ChessGame_")));
        assert!(!needs_default_name(Some("World Championship G1")));
    }

    #[test]
    fn test_next_default_name() {
        assert_eq!(next_default_name(None), "ChessGame_1");
        assert_eq!(next_default_name(Some("ChessGame_1")), "ChessGame_2");
        assert_eq!(next_default_name(Some("ChessGame_41")), "ChessGame_42");
        assert_eq!(next_default_name(Some("Casual game")), "ChessGame_1");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some(" Carlsen ")), Some("Carlsen"));
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
    }
}
