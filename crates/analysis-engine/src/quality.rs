//! Move quality classification from score deltas.

use serde::Serialize;

use crate::uci::Score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveQuality {
    Excellent,
    Good,
    Fine,
    Mediocre,
    Poor,
    Bad,
}

impl MoveQuality {
    /// Classify a signed centipawn difference. Each threshold is exclusive:
    /// a difference of exactly 100 is `Fine`, 101 is `Good`.
    pub fn from_diff(diff: i32) -> Self {
        match diff {
            d if d > 200 => MoveQuality::Excellent,
            d if d > 100 => MoveQuality::Good,
            d if d > 0 => MoveQuality::Fine,
            d if d > -100 => MoveQuality::Mediocre,
            d if d > -200 => MoveQuality::Poor,
            _ => MoveQuality::Bad,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoveQuality::Excellent => "excellent",
            MoveQuality::Good => "good",
            MoveQuality::Fine => "fine",
            MoveQuality::Mediocre => "mediocre",
            MoveQuality::Poor => "poor",
            MoveQuality::Bad => "bad",
        }
    }
}

impl std::fmt::Display for MoveQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Judgment of a single played move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveEvaluation {
    /// Played move in UCI notation
    #[serde(rename = "move")]
    pub mv: String,
    pub san: String,
    pub score_before: i32,
    pub score_after: i32,
    pub score_difference: i32,
    pub quality: MoveQuality,
    /// First moves of the engine's line after the played move
    pub best_continuation: Vec<String>,
}

pub const CONTINUATION_LEN: usize = 3;

impl MoveEvaluation {
    pub fn new(mv: String, san: String, before: Score, after: Score, after_pv: &[String]) -> Self {
        let score_before = before.to_cp();
        let score_after = after.to_cp();
        let score_difference = score_after - score_before;

        Self {
            mv,
            san,
            score_before,
            score_after,
            score_difference,
            quality: MoveQuality::from_diff(score_difference),
            best_continuation: after_pv.iter().take(CONTINUATION_LEN).cloned().collect(),
        }
    }
}
