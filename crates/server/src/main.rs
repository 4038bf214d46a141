use server::config;
use server::db;
use server::routes;

use analysis_engine::{openings, Analyzer, Engine};
use axum::{routing::{get, post}, Extension, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;

    // Connect to Postgres
    tracing::info!("Connecting to database...");
    let pool = db::pool::create_pool(&config.database_url).await?;

    // Run schema migrations
    tracing::info!("Running migrations...");
    db::pool::run_migrations(&pool).await?;

    // Opening table is built once and shared read-only
    let opening_table = openings::init(&config.openings_path);
    tracing::info!("Opening table ready with {} positions", opening_table.len());

    if !config.engine.path.exists() {
        tracing::warn!(
            "Engine binary not found at {} - analysis requests will fail",
            config.engine.path.display()
        );
    }
    let analyzer = Analyzer::new(Engine::new(config.engine.clone()));

    // CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        // Health
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        // Analysis
        .route(
            "/analyze",
            get(routes::analysis::analyze_usage).post(routes::analysis::analyze_position),
        )
        .route("/best-move", post(routes::analysis::best_move))
        .route("/api/evaluate-move", post(routes::analysis::evaluate_move))
        // Openings
        .route("/api/identify-opening", post(routes::openings::identify_opening))
        // Games
        .route(
            "/api/games",
            get(routes::games::list_games).post(routes::games::create_game),
        )
        .route("/api/save-game", post(routes::games::save_game_lenient))
        .route("/api/games/{game_id}", get(routes::games::get_game_by_id))
        // Players
        .route("/api/players/suggestions", get(routes::players::get_suggestions))
        // Shared state
        .layer(Extension(pool))
        .layer(Extension(analyzer))
        .layer(Extension(opening_table))
        .layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
