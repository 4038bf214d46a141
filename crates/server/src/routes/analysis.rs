use analysis_engine::chess_core::position::STANDARD_START_FEN;
use analysis_engine::{Analyzer, FullAnalysis};
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, message = "fen must not be empty"))]
    pub fen: String,
    #[validate(range(min = 1, max = 60, message = "depth must be between 1 and 60"))]
    pub depth: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BestMoveRequest {
    #[validate(length(min = 1, message = "fen must not be empty"))]
    pub fen: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EvaluateMoveRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "fen must not be empty"))]
    pub fen: String,
    #[serde(rename = "move", default)]
    #[validate(length(min = 1, message = "move must not be empty"))]
    pub mv: String,
    #[validate(range(min = 1, max = 60, message = "depth must be between 1 and 60"))]
    pub depth: Option<u32>,
}

/// GET /analyze
pub async fn analyze_usage() -> Json<JsonValue> {
    Json(serde_json::json!({
        "message": "Send a FEN string with POST to analyze a position",
        "example": { "fen": STANDARD_START_FEN },
    }))
}

/// POST /analyze
pub async fn analyze_position(
    Extension(analyzer): Extension<Analyzer>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<FullAnalysis>, AppError> {
    req.validate()?;
    let depth = req.depth.unwrap_or_else(|| analyzer.default_depth());
    let analysis = analyzer.full_analysis(req.fen.trim(), depth).await?;
    Ok(Json(analysis))
}

/// POST /best-move
pub async fn best_move(
    Extension(analyzer): Extension<Analyzer>,
    Json(req): Json<BestMoveRequest>,
) -> Result<Json<JsonValue>, AppError> {
    req.validate()?;
    let best_move = analyzer.quick_best_move(req.fen.trim()).await?;
    Ok(Json(serde_json::json!({ "best_move": best_move })))
}

/// POST /api/evaluate-move
/// Failures are reported in the body with HTTP 200.
pub async fn evaluate_move(
    Extension(analyzer): Extension<Analyzer>,
    Json(req): Json<EvaluateMoveRequest>,
) -> Json<JsonValue> {
    match run_evaluation(&analyzer, &req).await {
        Ok(body) => Json(body),
        Err(message) => {
            tracing::warn!(fen = %req.fen, mv = %req.mv, "Move evaluation failed: {message}");
            Json(serde_json::json!({ "status": "error", "message": message }))
        }
    }
}

async fn run_evaluation(analyzer: &Analyzer, req: &EvaluateMoveRequest) -> Result<JsonValue, String> {
    req.validate().map_err(|e| e.to_string())?;
    let depth = req.depth.unwrap_or_else(|| analyzer.default_depth());
    let evaluation = analyzer
        .evaluate_move(req.fen.trim(), req.mv.trim(), depth)
        .await
        .map_err(|e| e.to_string())?;

    Ok(serde_json::json!({
        "status": "success",
        "move": evaluation.mv,
        "san": evaluation.san,
        "score_before": evaluation.score_before,
        "score_after": evaluation.score_after,
        "score_difference": evaluation.score_difference,
        "quality": evaluation.quality,
        "best_continuation": evaluation.best_continuation,
        "depth": depth,
    }))
}
