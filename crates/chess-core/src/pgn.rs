//! PGN utilities: regex-based movetext and header extraction.

use std::sync::LazyLock;

use regex::Regex;
use shakmaty::Chess;

use crate::position::{parse_move, play, ChessError};

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("valid header regex"));
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|;[^\n]*").expect("valid comment regex"));
static VARIATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("valid variation regex"));
static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"O-O-O|O-O|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=[QRBN])?[+#]?")
        .expect("valid move regex")
});

/// Extract SAN moves from PGN text (after removing headers, comments, variations).
/// Move numbers, results and annotation glyphs are dropped.
pub fn extract_moves(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_RE.replace_all(pgn, "");
    let no_comments = COMMENT_RE.replace_all(&no_headers, "");
    let no_variations = VARIATION_RE.replace_all(&no_comments, "");

    MOVE_RE
        .find_iter(&no_variations)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Replay a SAN move list from the standard start position.
/// Fails on the first move that is unparsable or illegal.
pub fn replay_moves(moves: &[String]) -> Result<Chess, ChessError> {
    let mut pos = Chess::default();
    for san in moves {
        let mv = parse_move(&pos, san)?;
        pos = play(&pos, &mv);
    }
    Ok(pos)
}

/// Extract a string value from a PGN header (e.g. White, Black, ECO).
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().trim().to_string();
    if value.is_empty() || value == "?" {
        None
    } else {
        Some(value)
    }
}
