//! Engine and analysis error types

use std::time::Duration;

use chess_core::ChessError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid search limit: {0}")]
    InvalidLimit(String),

    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    #[error("Engine protocol error: {0}")]
    Protocol(String),

    #[error("Engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ChessError> for EngineError {
    fn from(e: ChessError) -> Self {
        match e {
            ChessError::InvalidFen { .. } => EngineError::InvalidPosition(e.to_string()),
            ChessError::IllegalMove(mv) => EngineError::IllegalMove(mv),
        }
    }
}
