//! Opening identification from a fingerprint table.
//!
//! The table is built once by replaying each opening line from the start
//! position, then shared read-only for the life of the process.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::OnceLock;

use chess_core::pgn::{extract_moves, replay_moves};
use chess_core::position::{board_key, parse_fen, to_fen};
use serde::{Deserialize, Serialize};
use shakmaty::Chess;

use crate::error::EngineError;

/// Default path to the opening records file.
pub const OPENINGS_FILE_PATH: &str = "data/openings.json";

pub const UNKNOWN_OPENING: &str = "Unknown opening";

/// One row of opening source data (Lichess `chess-openings` layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningRecord {
    pub eco: String,
    pub name: String,
    pub pgn: String,
}

impl OpeningRecord {
    fn new(eco: &str, name: &str, pgn: &str) -> Self {
        Self {
            eco: eco.to_string(),
            name: name.to_string(),
            pgn: pgn.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningEntry {
    pub name: String,
    /// ECO code; empty for the unknown sentinel
    pub code: String,
    /// Canonical line in SAN movetext
    pub pgn: String,
}

impl OpeningEntry {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_OPENING.to_string(),
            code: String::new(),
            pgn: String::new(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.code.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    fen: String,
    plies: usize,
    entry: OpeningEntry,
}

#[derive(Debug, Clone, Default)]
pub struct OpeningTable {
    slots: Vec<Slot>,
    /// Full FEN -> slot
    by_fen: HashMap<String, usize>,
    /// Placement + side to move -> slot with the shortest line
    by_board: HashMap<String, usize>,
}

impl OpeningTable {
    /// Build the table from records in order. Records whose line can't be
    /// replayed are skipped; a later record reaching the same position
    /// replaces an earlier one.
    pub fn build(records: &[OpeningRecord]) -> Self {
        let mut table = Self::default();
        let mut skipped = 0usize;

        for record in records {
            let moves = extract_moves(&record.pgn);
            if moves.is_empty() {
                tracing::warn!(eco = %record.eco, name = %record.name, "No moves in opening line, skipping");
                skipped += 1;
                continue;
            }

            let pos = match replay_moves(&moves) {
                Ok(pos) => pos,
                Err(e) => {
                    tracing::warn!(eco = %record.eco, name = %record.name, error = %e, "Unplayable opening line, skipping");
                    skipped += 1;
                    continue;
                }
            };

            let slot = Slot {
                fen: to_fen(&pos),
                plies: moves.len(),
                entry: OpeningEntry {
                    name: record.name.clone(),
                    code: record.eco.clone(),
                    pgn: record.pgn.clone(),
                },
            };

            match table.by_fen.get(&slot.fen) {
                Some(&idx) => table.slots[idx] = slot,
                None => {
                    table.by_fen.insert(slot.fen.clone(), table.slots.len());
                    table.slots.push(slot);
                }
            }
        }

        for (idx, slot) in table.slots.iter().enumerate() {
            let key = board_key(&slot.fen);
            match table.by_board.get(&key) {
                Some(&best) if table.slots[best].plies <= slot.plies => {}
                _ => {
                    table.by_board.insert(key, idx);
                }
            }
        }

        if skipped > 0 {
            tracing::warn!("Skipped {} opening records", skipped);
        }

        table
    }

    /// The small built-in table used when no records file is available.
    pub fn builtin() -> Self {
        Self::build(&builtin_records())
    }

    /// Load records from `path`, falling back to the built-in table when the
    /// file is missing, unreadable or yields no entries.
    pub fn load_or_builtin<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let table = match load_records(path) {
            Ok(records) => Self::build(&records),
            Err(e) => {
                tracing::warn!("Failed to load openings from {}: {}", path.display(), e);
                Self::default()
            }
        };

        if table.is_empty() {
            tracing::info!("Using built-in opening table");
            return Self::builtin();
        }

        tracing::info!("Loaded opening table: {} positions", table.len());
        table
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Full-FEN keys in build order.
    pub fn fingerprints(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.fen.as_str())
    }

    /// Exact position match first, then a board-equivalent one, else the
    /// unknown sentinel.
    pub fn identify(&self, pos: &Chess) -> OpeningEntry {
        let fen = to_fen(pos);

        self.by_fen
            .get(&fen)
            .or_else(|| self.by_board.get(&board_key(&fen)))
            .map(|&idx| self.slots[idx].entry.clone())
            .unwrap_or_else(OpeningEntry::unknown)
    }

    pub fn identify_fen(&self, fen: &str) -> Result<OpeningEntry, EngineError> {
        let pos = parse_fen(fen)?;
        Ok(self.identify(&pos))
    }
}

static OPENINGS: OnceLock<OpeningTable> = OnceLock::new();

/// Build the process-wide table from `path`. Only the first call builds;
/// later calls return the existing table.
pub fn init<P: AsRef<Path>>(path: P) -> &'static OpeningTable {
    OPENINGS.get_or_init(|| OpeningTable::load_or_builtin(path))
}

/// The process-wide table, built from the default path on first use.
pub fn global() -> &'static OpeningTable {
    init(OPENINGS_FILE_PATH)
}

/// Load records from a JSON file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<OpeningRecord>, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let records: Vec<OpeningRecord> = serde_json::from_reader(reader)?;
    Ok(records)
}

/// Save records to a JSON file.
pub fn save_records<P: AsRef<Path>>(records: &[OpeningRecord], path: P) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}

/// Parse `eco<TAB>name<TAB>pgn` rows, skipping the header and short rows.
pub fn parse_tsv(text: &str) -> Vec<OpeningRecord> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').map(str::trim).collect();
            match parts.as_slice() {
                ["eco", ..] => None,
                [eco, name, pgn, ..] => Some(OpeningRecord::new(eco, name, pgn)),
                _ => None,
            }
        })
        .collect()
}

fn builtin_records() -> Vec<OpeningRecord> {
    [
        ("A00", "Polish Opening", "1. b4"),
        ("A02", "Bird's Opening", "1. f4"),
        ("A04", "Reti Opening", "1. Nf3"),
        ("A10", "English Opening", "1. c4"),
        ("A40", "Queen's Pawn Game", "1. d4"),
        ("A45", "Indian Defense", "1. d4 Nf6"),
        ("A80", "Dutch Defense", "1. d4 f5"),
        ("B00", "King's Pawn Game", "1. e4"),
        ("B01", "Scandinavian Defense", "1. e4 d5"),
        ("B02", "Alekhine Defense", "1. e4 Nf6"),
        ("B07", "Pirc Defense", "1. e4 d6"),
        ("B20", "Sicilian Defense", "1. e4 c5"),
        ("B30", "Sicilian Defense: Old Sicilian", "1. e4 c5 2. Nf3 Nc6"),
        ("C00", "French Defense", "1. e4 e6"),
        ("C10", "French Defense: Paulsen Variation", "1. e4 e6 2. d4 d5 3. Nc3"),
        ("C20", "King's Pawn Game", "1. e4 e5"),
        ("C40", "King's Knight Opening", "1. e4 e5 2. Nf3"),
        ("C42", "Russian Game", "1. e4 e5 2. Nf3 Nf6"),
        ("C44", "King's Pawn Game: Knight Attack", "1. e4 e5 2. Nf3 Nc6"),
        ("C60", "Ruy Lopez", "1. e4 e5 2. Nf3 Nc6 3. Bb5"),
        ("C65", "Ruy Lopez: Berlin Defense", "1. e4 e5 2. Nf3 Nc6 3. Bb5 Nf6"),
        ("C70", "Ruy Lopez: Morphy Defense", "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. Ba4"),
        ("D00", "Queen's Pawn Game", "1. d4 d5"),
        ("D06", "Queen's Gambit", "1. d4 d5 2. c4"),
        ("D30", "Queen's Gambit Declined", "1. d4 d5 2. c4 e6"),
        ("D70", "Neo-Grunfeld Defense", "1. d4 Nf6 2. c4 g6 3. g3"),
        ("E00", "Catalan Opening", "1. d4 Nf6 2. c4 e6 3. g3"),
        ("E10", "Indian Defense", "1. d4 Nf6 2. c4 e6"),
        ("E60", "King's Indian Defense", "1. d4 Nf6 2. c4 g6"),
    ]
    .iter()
    .map(|(eco, name, pgn)| OpeningRecord::new(eco, name, pgn))
    .collect()
}
