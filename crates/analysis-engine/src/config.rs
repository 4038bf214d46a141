//! Engine configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Path to the UCI engine binary (Stockfish or compatible)
    pub path: PathBuf,

    /// Extra command-line arguments passed to the engine
    pub args: Vec<String>,

    /// `setoption name Threads`
    pub threads: u32,

    /// `setoption name Hash` in MB
    pub hash_mb: u32,

    /// Depth used when a request does not name one
    pub default_depth: u32,

    /// Time budget for quick best-move queries
    pub quick_move_time: Duration,

    /// Upper bound for the uci/isready handshake
    pub handshake_timeout: Duration,

    /// Wall-clock bound for a single search
    pub search_timeout: Duration,

    /// Grace period after `quit` before the process is killed
    pub shutdown_timeout: Duration,
}

impl EngineConfig {
    /// Configuration with defaults for everything but the binary path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            threads: 1,
            hash_mb: 64,
            default_depth: 20,
            quick_move_time: Duration::from_millis(100),
            handshake_timeout: Duration::from_secs(10),
            search_timeout: Duration::from_secs(120),
            shutdown_timeout: Duration::from_millis(500),
        }
    }

    /// Load configuration from environment variables. Unparsable values fall
    /// back to their defaults.
    pub fn from_env() -> Self {
        let path = env::var("STOCKFISH_PATH")
            .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string());

        let mut config = Self::new(path);

        config.args = env::var("STOCKFISH_ARGS")
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        if let Some(threads) = parse_var("ENGINE_THREADS") {
            config.threads = threads;
        }
        if let Some(hash_mb) = parse_var("ENGINE_HASH_MB") {
            config.hash_mb = hash_mb;
        }
        if let Some(depth) = parse_var::<u32>("DEFAULT_DEPTH").filter(|d| *d > 0) {
            config.default_depth = depth;
        }
        if let Some(ms) = parse_var::<u64>("QUICK_MOVE_TIME_MS").filter(|ms| *ms > 0) {
            config.quick_move_time = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var("HANDSHAKE_TIMEOUT_SECS") {
            config.handshake_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var("SEARCH_TIMEOUT_SECS") {
            config.search_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse_var("SHUTDOWN_TIMEOUT_MS") {
            config.shutdown_timeout = Duration::from_millis(ms);
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new("/usr/bin/stockfish");
        assert_eq!(config.default_depth, 20);
        assert_eq!(config.quick_move_time, Duration::from_millis(100));
        assert!(config.args.is_empty());
    }
}
