//! Position model: FEN validation, fingerprints and move parsing on top of shakmaty.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Illegal move '{0}'")]
    IllegalMove(String),
}

/// Parse and validate a FEN string into a playable position.
pub fn parse_fen(fen: &str) -> Result<Chess, ChessError> {
    let fen = fen.trim();
    let invalid = |reason: String| ChessError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };

    let parsed: Fen = fen.parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))
}

/// Serialize a position back to FEN. The en-passant square is only kept when
/// a capture is actually possible, so equal positions get equal strings.
pub fn to_fen(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

/// Placement and side to move only. Positions sharing this key are
/// board-equivalent even when rights or clocks differ.
pub fn board_key(fen: &str) -> String {
    fen.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Parse a move given in SAN ("Nf3", "exd5+", "O-O"), falling back to UCI
/// long notation ("g1f3"). The move must be legal in `pos`.
pub fn parse_move(pos: &Chess, text: &str) -> Result<Move, ChessError> {
    let text = text.trim();
    let illegal = || ChessError::IllegalMove(text.to_string());

    if let Ok(san) = text.parse::<SanPlus>() {
        if let Ok(mv) = san.san.to_move(pos) {
            return Ok(mv);
        }
    }

    let uci: UciMove = text.parse().map_err(|_| illegal())?;
    uci.to_move(pos).map_err(|_| illegal())
}

/// Parse an engine-reported UCI move and check it is legal in `pos`.
pub fn parse_uci_move(pos: &Chess, text: &str) -> Result<Move, ChessError> {
    let uci: UciMove = text
        .parse()
        .map_err(|_| ChessError::IllegalMove(text.to_string()))?;
    uci.to_move(pos)
        .map_err(|_| ChessError::IllegalMove(text.to_string()))
}

pub fn to_uci(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

pub fn to_san(pos: &Chess, mv: &Move) -> String {
    shakmaty::san::San::from_move(pos, mv.clone()).to_string()
}

/// Apply a legal move, returning the resulting position.
pub fn play(pos: &Chess, mv: &Move) -> Chess {
    let mut next = pos.clone();
    next.play_unchecked(mv.clone());
    next
}

/// True when the side to move has no legal moves (checkmate or stalemate).
pub fn is_terminal(pos: &Chess) -> bool {
    pos.legal_moves().is_empty()
}
