//! Request-level analysis: FEN strings in, engine results out.

use chess_core::position::parse_fen;
use serde::Serialize;
use tracing::info;

use crate::engine::Engine;
use crate::error::EngineError;
use crate::quality::MoveEvaluation;
use crate::uci::Limit;

/// Longest principal variation returned by a full analysis.
pub const MAX_PV_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullAnalysis {
    /// Display form of the score, e.g. "+35" or "#-2"
    pub score: Option<String>,
    pub best_move: Option<String>,
    pub pv: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Analyzer {
    engine: Engine,
}

impl Analyzer {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn default_depth(&self) -> u32 {
        self.engine.config().default_depth
    }

    /// Deep search at `depth` plus an independent quick best move.
    /// The two run concurrently on separate engine processes.
    pub async fn full_analysis(&self, fen: &str, depth: u32) -> Result<FullAnalysis, EngineError> {
        let pos = parse_fen(fen)?;
        let limit = Limit::depth(depth)?;

        let (result, best_move) = tokio::try_join!(
            self.engine.analyze(&pos, limit),
            self.engine.best_move(&pos, None),
        )?;

        info!(depth, score = ?result.score, best_move = ?best_move, "Full analysis complete");

        Ok(FullAnalysis {
            score: result.score.map(|s| s.to_string()),
            best_move,
            pv: result.pv.into_iter().take(MAX_PV_LEN).collect(),
        })
    }

    pub async fn quick_best_move(&self, fen: &str) -> Result<Option<String>, EngineError> {
        let pos = parse_fen(fen)?;
        self.engine.best_move(&pos, None).await
    }

    pub async fn evaluate_move(
        &self,
        fen: &str,
        mv: &str,
        depth: u32,
    ) -> Result<MoveEvaluation, EngineError> {
        let pos = parse_fen(fen)?;
        let limit = Limit::depth(depth)?;
        let evaluation = self.engine.evaluate_move(&pos, mv, limit).await?;

        info!(
            mv = %evaluation.mv,
            diff = evaluation.score_difference,
            quality = %evaluation.quality,
            "Move evaluated"
        );

        Ok(evaluation)
    }
}
