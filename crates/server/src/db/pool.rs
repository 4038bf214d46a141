use sqlx::postgres::{PgPool, PgPoolOptions};

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run the full Postgres schema migration inline.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Players (names unique case-insensitively)
CREATE TABLE IF NOT EXISTS players (
    id         BIGSERIAL PRIMARY KEY,
    name       TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_players_name_lower
    ON players (LOWER(name));

-- Saved games
CREATE TABLE IF NOT EXISTS games (
    id              BIGSERIAL PRIMARY KEY,
    name            TEXT NOT NULL,
    fen             TEXT NOT NULL,
    pgn             TEXT NOT NULL DEFAULT '',
    white_player_id BIGINT REFERENCES players(id),
    black_player_id BIGINT REFERENCES players(id),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ
);

CREATE INDEX IF NOT EXISTS idx_games_name       ON games (name);
CREATE INDEX IF NOT EXISTS idx_games_created_at ON games (created_at DESC);
"#;
