use axum::{extract::Path, extract::Query, Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use validator::Validate;

use crate::db::games::{self, Game, NewGame};
use crate::error::AppError;

// Accepted spellings per field, highest precedence first
const FEN_ALIASES: &[&str] = &["fen", "position", "current_fen"];
const PGN_ALIASES: &[&str] = &["pgn", "moves", "game_pgn"];
const NAME_ALIASES: &[&str] = &["name", "title", "game_name"];
const WHITE_ALIASES: &[&str] = &["white_player", "whitePlayer", "white"];
const BLACK_ALIASES: &[&str] = &["black_player", "blackPlayer", "black"];

#[derive(Debug, Deserialize, Validate)]
pub struct SaveGameRequest {
    pub name: Option<String>,
    #[validate(length(min = 1, message = "fen must not be empty"))]
    pub fen: String,
    pub pgn: Option<String>,
    pub white_player: Option<String>,
    pub black_player: Option<String>,
}

impl From<SaveGameRequest> for NewGame {
    fn from(req: SaveGameRequest) -> Self {
        NewGame {
            name: req.name,
            fen: req.fen,
            pgn: req.pgn,
            white_player: req.white_player,
            black_player: req.black_player,
        }
    }
}

#[derive(Deserialize)]
pub struct ListGamesQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// First alias holding a non-blank string.
fn pick(body: &JsonValue, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| body.get(*key).and_then(JsonValue::as_str))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// Map a loosely-keyed save request onto the canonical fields.
pub fn normalize_save_request(body: &JsonValue) -> Result<SaveGameRequest, AppError> {
    if !body.is_object() {
        return Err(AppError::BadRequest("Request body must be a JSON object".into()));
    }

    let fen = pick(body, FEN_ALIASES).ok_or_else(|| {
        AppError::BadRequest(format!("Missing position; expected one of {}", FEN_ALIASES.join(", ")))
    })?;

    Ok(SaveGameRequest {
        name: pick(body, NAME_ALIASES),
        fen,
        pgn: pick(body, PGN_ALIASES),
        white_player: pick(body, WHITE_ALIASES),
        black_player: pick(body, BLACK_ALIASES),
    })
}

/// POST /api/games
pub async fn create_game(
    Extension(pool): Extension<PgPool>,
    Json(req): Json<SaveGameRequest>,
) -> Result<Json<Game>, AppError> {
    req.validate()?;
    let game = games::save_game(&pool, &req.into()).await?;
    Ok(Json(game))
}

/// POST /api/save-game
pub async fn save_game_lenient(
    Extension(pool): Extension<PgPool>,
    Json(body): Json<JsonValue>,
) -> Result<Json<Game>, AppError> {
    let req = normalize_save_request(&body)?;
    req.validate()?;
    let game = games::save_game(&pool, &req.into()).await?;
    Ok(Json(game))
}

/// GET /api/games
pub async fn list_games(
    Extension(pool): Extension<PgPool>,
    Query(q): Query<ListGamesQuery>,
) -> Result<Json<Vec<Game>>, AppError> {
    let list = games::list_games(&pool, q.skip, q.limit).await?;
    Ok(Json(list))
}

/// GET /api/games/{game_id}
pub async fn get_game_by_id(
    Extension(pool): Extension<PgPool>,
    Path(game_id): Path<i64>,
) -> Result<Json<Game>, AppError> {
    let game = games::get_game(&pool, game_id)
        .await?
        .ok_or(AppError::NotFound("Game not found".into()))?;

    Ok(Json(game))
}
