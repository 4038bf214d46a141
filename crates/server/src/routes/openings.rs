use analysis_engine::{OpeningEntry, OpeningTable};
use axum::{Extension, Json};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct IdentifyOpeningRequest {
    #[validate(length(min = 1, message = "fen must not be empty"))]
    pub fen: String,
}

/// POST /api/identify-opening
pub async fn identify_opening(
    Extension(openings): Extension<&'static OpeningTable>,
    Json(req): Json<IdentifyOpeningRequest>,
) -> Result<Json<OpeningEntry>, AppError> {
    req.validate()?;
    let entry = openings.identify_fen(req.fen.trim())?;
    if entry.is_unknown() {
        tracing::debug!(fen = %req.fen, "No opening matched");
    }
    Ok(Json(entry))
}
