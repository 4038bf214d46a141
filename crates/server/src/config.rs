use std::env;

use analysis_engine::openings::OPENINGS_FILE_PATH;
use analysis_engine::EngineConfig;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub engine: EngineConfig,
    pub openings_path: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            engine: EngineConfig::from_env(),
            openings_path: env::var("OPENINGS_PATH")
                .unwrap_or_else(|_| OPENINGS_FILE_PATH.to_string()),
        })
    }
}
