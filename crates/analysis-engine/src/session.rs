//! One UCI engine process, spoken to over async line I/O.
//!
//! A session is started per analysis call and must be closed with
//! [`EngineSession::shutdown`] or [`EngineSession::kill`]. If it is dropped
//! while still open (error path, cancelled request) the process is killed.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::uci::{self, EngineLine, Limit, Score};

/// Everything the engine reported for one `go` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    pub score: Option<Score>,
    pub depth: Option<u32>,
    pub pv: Vec<String>,
    pub best_move: Option<String>,
}

pub struct EngineSession {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    closed: bool,
}

impl EngineSession {
    /// Spawn the configured engine and complete the UCI handshake.
    pub async fn start(config: &EngineConfig) -> Result<Self, EngineError> {
        check_executable(&config.path)?;

        let mut process = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("failed to spawn {}: {e}", config.path.display()))
            })?;

        debug!(pid = ?process.id(), path = %config.path.display(), "Engine spawned");

        // Dropping `process` here kills it via kill_on_drop
        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdin was not captured".into()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Unavailable("engine stdout was not captured".into()))?;

        let mut session = Self {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            closed: false,
        };

        let handshake = match timeout(config.handshake_timeout, session.handshake(config)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout(config.handshake_timeout)),
        };

        if let Err(e) = handshake {
            session.kill().await;
            return Err(e);
        }

        Ok(session)
    }

    async fn handshake(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        self.send(&format!("setoption name Threads value {}", config.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", config.hash_mb))
            .await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command line to the engine
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Protocol(format!("failed to write to engine: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Protocol(format!("failed to flush engine stdin: {e}")))?;
        Ok(())
    }

    /// Next trimmed output line, or `None` once the engine closed stdout.
    async fn read_line(&mut self) -> Result<Option<String>, EngineError> {
        let mut buf = Vec::new();
        let n = self.stdout.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(None);
        }
        // Undecodable bytes are replaced with U+FFFD rather than rejected
        let trimmed = String::from_utf8_lossy(&buf).trim().to_string();
        debug!(line = %trimmed, "SF >");
        Ok(Some(trimmed))
    }

    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        loop {
            match self.read_line().await? {
                Some(line) if line == expected => return Ok(()),
                Some(_) => continue,
                None => {
                    return Err(EngineError::Protocol(format!(
                        "engine exited while waiting for '{expected}'"
                    )))
                }
            }
        }
    }

    /// Search `fen` under `limit` and collect output until `bestmove`.
    pub async fn search(&mut self, fen: &str, limit: Limit) -> Result<SearchOutcome, EngineError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&limit.go_command()).await?;

        let mut outcome = SearchOutcome::default();

        loop {
            let Some(line) = self.read_line().await? else {
                return Err(EngineError::Protocol(
                    "engine exited before reporting bestmove".into(),
                ));
            };

            match uci::parse_line(&line) {
                EngineLine::Info(info) => {
                    // Secondary multi-PV lines never override the main line
                    if info.multipv.is_some_and(|idx| idx != 1) {
                        continue;
                    }
                    if let Some(score) = info.score.filter(|_| !info.bound) {
                        outcome.score = Some(score);
                        outcome.depth = info.depth.or(outcome.depth);
                    }
                    if !info.pv.is_empty() {
                        outcome.pv = info.pv;
                    }
                }
                EngineLine::BestMove(best_move) => {
                    outcome.best_move = best_move;
                    return Ok(outcome);
                }
                EngineLine::Other => {}
            }
        }
    }

    /// Ask the engine to quit, killing it if it doesn't exit within `grace`.
    pub async fn shutdown(mut self, grace: Duration) {
        let _ = self.send("quit").await;
        match timeout(grace, self.process.wait()).await {
            Ok(Ok(status)) => {
                debug!(%status, "Engine exited");
                self.closed = true;
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to wait for engine exit, killing");
                self.kill().await;
            }
            Err(_) => {
                warn!(?grace, "Engine ignored quit, killing");
                self.kill().await;
            }
        }
    }

    /// Force-terminate the process and reap it.
    pub async fn kill(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.process.kill().await {
            warn!(error = %e, "Failed to kill engine process");
        }
        self.closed = true;
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if !self.closed {
            warn!("Engine session dropped while open, killing process");
            let _ = self.process.start_kill();
        }
    }
}

/// Fail fast with `Unavailable` when the binary is missing or not runnable.
fn check_executable(path: &Path) -> Result<(), EngineError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        EngineError::Unavailable(format!("engine not found at {}: {e}", path.display()))
    })?;

    if !metadata.is_file() {
        return Err(EngineError::Unavailable(format!(
            "engine path {} is not a file",
            path.display()
        )));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(EngineError::Unavailable(format!(
                "engine at {} is not executable",
                path.display()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let err = check_executable(Path::new("/definitely/not/here/stockfish")).unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_executable(dir.path()).unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_is_unavailable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = check_executable(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
    }
}
