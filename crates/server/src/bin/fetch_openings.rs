//! Download the Lichess opening tables and write the JSON record file.
//!
//! Usage: cargo run --bin fetch-openings [-- OUTPUT_PATH]
//!
//! Writes to OPENINGS_PATH (or data/openings.json) when no path is given.

use analysis_engine::openings::{parse_tsv, save_records, OpeningTable, OPENINGS_FILE_PATH};
use reqwest::Client;
use std::fs;
use std::path::PathBuf;

const SOURCE_BASE_URL: &str = "https://raw.githubusercontent.com/lichess-org/chess-openings/master";
const VOLUMES: &[&str] = &["a", "b", "c", "d", "e"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let output: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OPENINGS_PATH").ok())
        .unwrap_or_else(|| OPENINGS_FILE_PATH.to_string())
        .into();

    let client = Client::builder()
        .user_agent("ChessAnalysis/1.0")
        .timeout(std::time::Duration::from_secs(60))
        .build()?;

    let mut records = Vec::new();
    for volume in VOLUMES {
        let url = format!("{SOURCE_BASE_URL}/{volume}.tsv");
        tracing::info!("Fetching {url}");

        let resp = client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {} for {url}", resp.status()).into());
        }

        let parsed = parse_tsv(&resp.text().await?);
        tracing::info!(volume, count = parsed.len(), "Parsed openings");
        records.extend(parsed);
    }

    // Build once so bad lines are reported before the file is written
    let table = OpeningTable::build(&records);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    save_records(&records, &output)?;

    tracing::info!(
        records = records.len(),
        positions = table.len(),
        path = %output.display(),
        "Fetch complete"
    );

    Ok(())
}
