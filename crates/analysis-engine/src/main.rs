//! Command-line analysis of a single position.
//!
//! Usage: analyze-position [--fen FEN] [--depth N] [--move SAN] [--quick] [--time SECS]
//!
//! Prints the full analysis (or move evaluation when --move is given)
//! together with the identified opening, as JSON. --time runs a single
//! time-bounded search and prints the raw engine result.

use analysis_engine::chess_core::position::{parse_fen, STANDARD_START_FEN};
use analysis_engine::{openings, Analyzer, Engine, EngineConfig, Limit};
use tracing::info;

struct Args {
    fen: String,
    depth: Option<u32>,
    mv: Option<String>,
    quick: bool,
    time: Option<Limit>,
}

/// Parse flags from CLI args; unknown flags are ignored
fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args {
        fen: STANDARD_START_FEN.to_string(),
        depth: None,
        mv: None,
        quick: false,
        time: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1).cloned();
        match args[i].as_str() {
            "--fen" => {
                parsed.fen = value.ok_or_else(|| anyhow::anyhow!("--fen needs a value"))?;
                i += 1;
            }
            "--depth" => {
                let depth = value.ok_or_else(|| anyhow::anyhow!("--depth needs a value"))?;
                parsed.depth = Some(depth.parse()?);
                i += 1;
            }
            "--move" => {
                parsed.mv = Some(value.ok_or_else(|| anyhow::anyhow!("--move needs a value"))?);
                i += 1;
            }
            "--quick" => parsed.quick = true,
            "--time" => {
                let secs = value.ok_or_else(|| anyhow::anyhow!("--time needs a value"))?;
                parsed.time = Some(Limit::seconds(secs.parse()?)?);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    Ok(parsed)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args = parse_args(&std::env::args().collect::<Vec<_>>())?;
    let config = EngineConfig::from_env();
    info!(path = %config.path.display(), "Engine config loaded");

    let depth = args.depth.unwrap_or(config.default_depth);
    let openings_path =
        std::env::var("OPENINGS_PATH").unwrap_or_else(|_| openings::OPENINGS_FILE_PATH.to_string());
    let opening = openings::init(openings_path).identify_fen(&args.fen)?;

    let analyzer = Analyzer::new(Engine::new(config));

    let output = if let Some(limit) = args.time {
        let pos = parse_fen(&args.fen)?;
        let result = analyzer.engine().analyze(&pos, limit).await?;
        serde_json::json!({ "result": result, "opening": opening })
    } else if args.quick {
        let best_move = analyzer.quick_best_move(&args.fen).await?;
        serde_json::json!({ "best_move": best_move, "opening": opening })
    } else if let Some(mv) = &args.mv {
        let evaluation = analyzer.evaluate_move(&args.fen, mv, depth).await?;
        serde_json::json!({ "evaluation": evaluation, "depth": depth, "opening": opening })
    } else {
        let analysis = analyzer.full_analysis(&args.fen, depth).await?;
        serde_json::json!({ "analysis": analysis, "depth": depth, "opening": opening })
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
