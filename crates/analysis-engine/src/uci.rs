//! UCI line protocol: search limits, scores and engine output parsing.
//!
//! Parsing is forward-compatible: tokens and lines that don't match the
//! expected grammar are ignored rather than rejected.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::EngineError;

/// Comparison value for a forced mate, before adjusting for distance.
pub const MATE_SCORE: i32 = 10_000;

/// Search budget for a single `go` command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    Depth(u32),
    Time(Duration),
}

impl Limit {
    pub fn depth(depth: u32) -> Result<Self, EngineError> {
        if depth == 0 {
            return Err(EngineError::InvalidLimit("depth must be positive".into()));
        }
        Ok(Limit::Depth(depth))
    }

    pub fn seconds(secs: f64) -> Result<Self, EngineError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(EngineError::InvalidLimit(format!(
                "time must be a positive number of seconds, got {secs}"
            )));
        }
        let budget = Duration::try_from_secs_f64(secs).map_err(|_| {
            EngineError::InvalidLimit(format!("time of {secs} seconds is out of range"))
        })?;
        Self::time(budget)
    }

    pub fn time(budget: Duration) -> Result<Self, EngineError> {
        if budget.is_zero() {
            return Err(EngineError::InvalidLimit("time must be positive".into()));
        }
        Ok(Limit::Time(budget))
    }

    pub fn go_command(&self) -> String {
        match self {
            Limit::Depth(depth) => format!("go depth {depth}"),
            Limit::Time(budget) => format!("go movetime {}", budget.as_millis().max(1)),
        }
    }

    /// Time the engine itself is allowed to spend, on top of any wall-clock bound.
    pub fn allotted(&self) -> Duration {
        match self {
            Limit::Depth(_) => Duration::ZERO,
            Limit::Time(budget) => *budget,
        }
    }
}

/// Engine score relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    Cp(i32),
    /// Mate in N moves; negative when the side to move gets mated.
    Mate(i32),
}

impl Score {
    /// Centipawn value for comparisons, with mates mapped near ±MATE_SCORE.
    pub fn to_cp(&self) -> i32 {
        match *self {
            Score::Cp(cp) => cp.clamp(-MATE_SCORE, MATE_SCORE),
            // Distances are capped so a mate never reaches zero
            Score::Mate(n) if n > 0 => MATE_SCORE - n.min(MATE_SCORE - 1),
            Score::Mate(n) => -MATE_SCORE - n.max(-(MATE_SCORE - 1)),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Score::Cp(cp) if cp > 0 => write!(f, "+{cp}"),
            Score::Cp(cp) => write!(f, "{cp}"),
            Score::Mate(n) if n > 0 => write!(f, "#+{n}"),
            Score::Mate(n) => write!(f, "#-{}", n.unsigned_abs()),
        }
    }
}

/// Fields of interest from an `info` line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub seldepth: Option<u32>,
    pub multipv: Option<u32>,
    pub score: Option<Score>,
    /// Score is only a lower or upper bound (aspiration window fail)
    pub bound: bool,
    pub nodes: Option<u64>,
    pub nps: Option<u64>,
    pub time_ms: Option<u64>,
    pub pv: Vec<String>,
}

/// One line of engine output.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineLine {
    Info(InfoLine),
    /// `bestmove <move>`; `None` for `(none)` / `0000`
    BestMove(Option<String>),
    Other,
}

const INFO_KEYWORDS: &[&str] = &[
    "depth", "seldepth", "time", "nodes", "pv", "multipv", "score", "currmove",
    "currmovenumber", "hashfull", "nps", "tbhits", "sbhits", "cpuload", "string",
    "refutation", "currline", "wdl", "bmc",
];

pub fn parse_line(line: &str) -> EngineLine {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("info") => EngineLine::Info(parse_info(tokens.collect())),
        Some("bestmove") => {
            let mv = tokens
                .next()
                .filter(|m| *m != "(none)" && *m != "0000")
                .map(String::from);
            EngineLine::BestMove(mv)
        }
        _ => EngineLine::Other,
    }
}

fn parse_info(tokens: Vec<&str>) -> InfoLine {
    let mut info = InfoLine::default();
    let mut i = 0;

    while i < tokens.len() {
        let next = tokens.get(i + 1).copied();
        match tokens[i] {
            "depth" => info.depth = next.and_then(|v| v.parse().ok()),
            "seldepth" => info.seldepth = next.and_then(|v| v.parse().ok()),
            "multipv" => info.multipv = next.and_then(|v| v.parse().ok()),
            "nodes" => info.nodes = next.and_then(|v| v.parse().ok()),
            "nps" => info.nps = next.and_then(|v| v.parse().ok()),
            "time" => info.time_ms = next.and_then(|v| v.parse().ok()),
            "score" => {
                let value = tokens.get(i + 2).and_then(|v| v.parse::<i32>().ok());
                info.score = match (next, value) {
                    (Some("cp"), Some(v)) => Some(Score::Cp(v)),
                    (Some("mate"), Some(v)) => Some(Score::Mate(v)),
                    _ => None,
                };
                i += 3;
                if let Some(&("lowerbound" | "upperbound")) = tokens.get(i) {
                    info.bound = true;
                    i += 1;
                }
                continue;
            }
            "pv" => {
                i += 1;
                while i < tokens.len() && !INFO_KEYWORDS.contains(&tokens[i]) {
                    info.pv.push(tokens[i].to_string());
                    i += 1;
                }
                continue;
            }
            // Free text runs to end of line
            "string" => break,
            _ => {
                i += 1;
                continue;
            }
        }
        i += 2;
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cp() {
        let line = "info depth 20 seldepth 25 multipv 1 score cp 35 nodes 100000 pv e2e4";
        let EngineLine::Info(info) = parse_line(line) else {
            panic!("expected info line");
        };
        assert_eq!(info.depth, Some(20));
        assert_eq!(info.seldepth, Some(25));
        assert_eq!(info.multipv, Some(1));
        assert_eq!(info.score, Some(Score::Cp(35)));
        assert_eq!(info.nodes, Some(100000));
        assert_eq!(info.pv, vec!["e2e4"]);
        assert!(!info.bound);
    }

    #[test]
    fn test_parse_mate() {
        let line = "info depth 20 score mate -3 nodes 100000 pv e2e4";
        let EngineLine::Info(info) = parse_line(line) else {
            panic!("expected info line");
        };
        assert_eq!(info.score, Some(Score::Mate(-3)));
    }

    #[test]
    fn test_parse_bound_and_trailing_fields() {
        let line = "info depth 12 score cp 50 lowerbound nodes 4000 pv e2e4 e7e5 g1f3 bmc 0.5";
        let EngineLine::Info(info) = parse_line(line) else {
            panic!("expected info line");
        };
        assert!(info.bound);
        assert_eq!(info.nodes, Some(4000));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn test_parse_info_string_is_ignored() {
        let line = "info string NNUE evaluation using nn-abc.nnue enabled pv depth";
        let EngineLine::Info(info) = parse_line(line) else {
            panic!("expected info line");
        };
        assert_eq!(info, InfoLine::default());
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(
            parse_line("bestmove e2e4 ponder e7e5"),
            EngineLine::BestMove(Some("e2e4".into()))
        );
        assert_eq!(parse_line("bestmove (none)"), EngineLine::BestMove(None));
        assert_eq!(parse_line("bestmove 0000"), EngineLine::BestMove(None));
        assert_eq!(parse_line("readyok"), EngineLine::Other);
        assert_eq!(parse_line(""), EngineLine::Other);
    }

    #[test]
    fn test_score_to_cp() {
        assert_eq!(Score::Cp(35).to_cp(), 35);
        assert_eq!(Score::Mate(3).to_cp(), 9997);
        assert_eq!(Score::Mate(-2).to_cp(), -9998);
        assert_eq!(Score::Mate(0).to_cp(), -10000);
        assert_eq!(Score::Cp(25_000).to_cp(), 10000);
    }

    #[test]
    fn test_distant_mates_keep_their_sign() {
        assert_eq!(Score::Mate(10_000).to_cp(), 1);
        assert_eq!(Score::Mate(i32::MAX).to_cp(), 1);
        assert_eq!(Score::Mate(-10_000).to_cp(), -1);
        assert_eq!(Score::Mate(i32::MIN).to_cp(), -1);
        assert!(Score::Mate(-9_999).to_cp() < 0);
    }

    #[test]
    fn test_score_display() {
        assert_eq!(Score::Cp(35).to_string(), "+35");
        assert_eq!(Score::Cp(-20).to_string(), "-20");
        assert_eq!(Score::Cp(0).to_string(), "0");
        assert_eq!(Score::Mate(3).to_string(), "#+3");
        assert_eq!(Score::Mate(-2).to_string(), "#-2");
    }

    #[test]
    fn test_limits() {
        assert_eq!(Limit::depth(10).unwrap().go_command(), "go depth 10");
        assert!(matches!(Limit::depth(0), Err(EngineError::InvalidLimit(_))));
        assert_eq!(Limit::seconds(0.1).unwrap().go_command(), "go movetime 100");
        assert_eq!(
            Limit::time(Duration::from_micros(10)).unwrap().go_command(),
            "go movetime 1"
        );
        assert!(Limit::seconds(0.0).is_err());
        assert!(Limit::seconds(f64::NAN).is_err());
        assert!(Limit::time(Duration::ZERO).is_err());
    }

    #[test]
    fn test_huge_time_limit_is_rejected() {
        assert!(matches!(Limit::seconds(1e20), Err(EngineError::InvalidLimit(_))));
        assert!(matches!(Limit::seconds(f64::INFINITY), Err(EngineError::InvalidLimit(_))));
        assert!(matches!(Limit::seconds(-1.0), Err(EngineError::InvalidLimit(_))));
        assert_eq!(Limit::seconds(3600.0).unwrap().allotted(), Duration::from_secs(3600));
    }
}
