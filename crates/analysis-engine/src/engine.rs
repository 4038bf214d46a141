//! Engine operations: each call owns one engine process for its duration.

use std::sync::Arc;
use std::time::Duration;

use chess_core::position::{is_terminal, parse_move, parse_uci_move, play, to_fen, to_san, to_uci};
use serde::Serialize;
use shakmaty::Chess;
use tokio::time::timeout;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::quality::MoveEvaluation;
use crate::session::{EngineSession, SearchOutcome};
use crate::uci::{Limit, Score};

/// Result of a single bounded search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineResult {
    /// Score relative to the side to move
    pub score: Option<Score>,
    /// Principal variation in UCI notation
    pub pv: Vec<String>,
    /// `None` only when the position has no legal moves
    pub best_move: Option<String>,
    pub depth: Option<u32>,
}

impl From<SearchOutcome> for EngineResult {
    fn from(outcome: SearchOutcome) -> Self {
        Self {
            score: outcome.score,
            pv: outcome.pv,
            best_move: outcome.best_move,
            depth: outcome.depth,
        }
    }
}

/// Handle to the configured engine binary. Cheap to clone; holds no process.
#[derive(Clone, Debug)]
pub struct Engine {
    config: Arc<EngineConfig>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Search `pos` under `limit` and return score, PV and best move.
    pub async fn analyze(&self, pos: &Chess, limit: Limit) -> Result<EngineResult, EngineError> {
        let mut outcomes = self.run(&[(pos, limit)]).await?;
        let outcome = outcomes
            .pop()
            .ok_or_else(|| EngineError::Protocol("engine produced no search result".into()))?;
        Ok(outcome.into())
    }

    /// Quick move under a short time budget (default `quick_move_time`).
    /// Terminal positions return `None` without starting the engine.
    pub async fn best_move(
        &self,
        pos: &Chess,
        budget: Option<Duration>,
    ) -> Result<Option<String>, EngineError> {
        if is_terminal(pos) {
            debug!("No legal moves, skipping engine");
            return Ok(None);
        }

        let limit = Limit::time(budget.unwrap_or(self.config.quick_move_time))?;
        let mut outcomes = self.run(&[(pos, limit)]).await?;
        Ok(outcomes.pop().and_then(|o| o.best_move))
    }

    /// Score `pos` before and after `mv_text` and classify the difference.
    /// An illegal move is rejected before any engine process is started.
    pub async fn evaluate_move(
        &self,
        pos: &Chess,
        mv_text: &str,
        limit: Limit,
    ) -> Result<MoveEvaluation, EngineError> {
        let mv = parse_move(pos, mv_text)?;
        let san = to_san(pos, &mv);
        let after = play(pos, &mv);

        let outcomes = self.run(&[(pos, limit), (&after, limit)]).await?;
        let (before_outcome, after_outcome) = match outcomes.as_slice() {
            [before, after] => (before, after),
            _ => return Err(EngineError::Protocol("engine produced too few search results".into())),
        };

        let score_before = before_outcome.score.ok_or_else(|| {
            EngineError::Protocol("no score reported for the position before the move".into())
        })?;
        let score_after = after_outcome.score.ok_or_else(|| {
            EngineError::Protocol("no score reported for the position after the move".into())
        })?;

        Ok(MoveEvaluation::new(
            to_uci(&mv),
            san,
            score_before,
            score_after,
            &after_outcome.pv,
        ))
    }

    /// Run searches in order on one fresh session. The process is always
    /// terminated before returning: killed on timeout, asked to quit otherwise.
    async fn run(&self, searches: &[(&Chess, Limit)]) -> Result<Vec<SearchOutcome>, EngineError> {
        let mut session = EngineSession::start(&self.config).await?;

        let result = self.search_all(&mut session, searches).await;
        match &result {
            Err(EngineError::Timeout(_)) => session.kill().await,
            _ => session.shutdown(self.config.shutdown_timeout).await,
        }

        result
    }

    async fn search_all(
        &self,
        session: &mut EngineSession,
        searches: &[(&Chess, Limit)],
    ) -> Result<Vec<SearchOutcome>, EngineError> {
        let mut outcomes = Vec::with_capacity(searches.len());

        for (pos, limit) in searches {
            let fen = to_fen(pos);
            let deadline = self.config.search_timeout.saturating_add(limit.allotted());

            let outcome = timeout(deadline, session.search(&fen, *limit))
                .await
                .map_err(|_| EngineError::Timeout(deadline))??;

            check_best_move(pos, &outcome)?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// The engine's best move must be legal, and present unless the game is over.
fn check_best_move(pos: &Chess, outcome: &SearchOutcome) -> Result<(), EngineError> {
    match &outcome.best_move {
        Some(mv) => parse_uci_move(pos, mv).map(|_| ()).map_err(|_| {
            EngineError::Protocol(format!("engine reported illegal best move '{mv}'"))
        }),
        None if is_terminal(pos) => Ok(()),
        None => Err(EngineError::Protocol(
            "engine reported no best move for a position with legal moves".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::position::parse_fen;

    fn outcome(best_move: Option<&str>) -> SearchOutcome {
        SearchOutcome {
            best_move: best_move.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_best_move() {
        let start = Chess::default();
        assert!(check_best_move(&start, &outcome(Some("e2e4"))).is_ok());
        assert!(matches!(
            check_best_move(&start, &outcome(Some("e2e5"))),
            Err(EngineError::Protocol(_))
        ));
        assert!(matches!(
            check_best_move(&start, &outcome(None)),
            Err(EngineError::Protocol(_))
        ));

        let mated =
            parse_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(check_best_move(&mated, &outcome(None)).is_ok());
    }

    #[tokio::test]
    async fn test_illegal_move_needs_no_engine() {
        // Binary does not exist: reaching the engine would be `Unavailable`
        let engine = Engine::new(EngineConfig::new("/definitely/not/here/stockfish"));
        let err = engine
            .evaluate_move(&Chess::default(), "Ke2", Limit::Depth(5))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalMove(mv) if mv == "Ke2"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let engine = Engine::new(EngineConfig::new("/definitely/not/here/stockfish"));
        let err = engine
            .analyze(&Chess::default(), Limit::Depth(5))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }
}
