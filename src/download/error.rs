//! Error types for the download module.
//!
//! Every failure of the external engine (spawn, extraction, disk) is captured
//! here so the orchestrator can turn it into a structured result instead of a
//! fault at the request boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while driving the external media engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable could not be started.
    #[error("could not start {binary}: {source}")]
    Spawn {
        /// Executable that failed to start.
        binary: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but reported failure.
    #[error("{}", exit_message(.code, .stderr))]
    Exited {
        /// Process exit code, if the process was not killed by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The metadata probe printed something that is not the expected JSON.
    #[error("unreadable metadata from engine: {source}")]
    InvalidMetadata {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// File system error around the download directory.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Creates a spawn error.
    pub fn spawn(binary: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            binary: binary.into(),
            source,
        }
    }

    /// Creates an exit error from raw stderr bytes.
    #[must_use]
    pub fn exited(code: Option<i32>, stderr: &[u8]) -> Self {
        Self::Exited {
            code,
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[allow(clippy::ref_option)]
fn exit_message(code: &Option<i32>, stderr: &str) -> String {
    // yt-dlp prints its own "ERROR: ..." line; prefer the last one over the full log
    let detail = stderr
        .lines()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| stderr.lines().rev().find(|line| !line.trim().is_empty()))
        .map(str::trim);

    match (detail, code) {
        (Some(detail), _) => detail.to_string(),
        (None, Some(code)) => format!("engine exited with status {code}"),
        (None, None) => "engine terminated by signal".to_string(),
    }
}
