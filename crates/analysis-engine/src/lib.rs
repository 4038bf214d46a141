pub use chess_core;

pub mod analyzer;
pub mod config;
pub mod engine;
pub mod error;
pub mod openings;
pub mod quality;
pub mod session;
pub mod uci;

pub use analyzer::{Analyzer, FullAnalysis};
pub use config::EngineConfig;
pub use engine::{Engine, EngineResult};
pub use error::EngineError;
pub use openings::{OpeningEntry, OpeningTable};
pub use quality::{MoveEvaluation, MoveQuality};
pub use uci::{Limit, Score};
