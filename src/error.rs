//! Error types for url-dl
//!
//! Errors fall into three groups:
//! - Startup errors (log file, download directory, configuration) which are fatal
//! - Submission errors returned to the caller of [`DownloadCoordinator::submit`]
//! - Worker-local errors (fetch and log write failures) which never leave the worker
//!
//! [`DownloadCoordinator::submit`]: crate::DownloadCoordinator::submit

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for url-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for url-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "log_path")
        key: Option<String>,
    },

    /// The download log could not be opened or created
    #[error("failed to open download log {path}: {source}")]
    LogOpen {
        /// Path of the log file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing or syncing a log entry failed
    #[error("failed to write download log entry: {source}")]
    LogWrite {
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The download log has already been closed
    #[error("download log is closed")]
    LogClosed,

    /// Shutdown in progress - not accepting new downloads
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// Submitted URL is unusable
    #[error("invalid URL: {0:?}")]
    InvalidUrl(String),

    /// Fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error should abort the process when it happens at startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config { .. } | Error::LogOpen { .. } | Error::Io(_) | Error::Serialization(_)
        )
    }
}

/// Failure reported by a [`Fetcher`](crate::fetch::Fetcher)
///
/// A fetch failure is transient from the coordinator's point of view: it ends up
/// as a `failed` log entry and does not affect other downloads.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The external transfer tool could not be started
    #[error("failed to run {tool}: {source}")]
    ToolUnavailable {
        /// Tool that was invoked
        tool: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The external transfer tool exited unsuccessfully
    #[error("{tool} exited with {}", describe_exit(.code))]
    ToolFailed {
        /// Tool that was invoked
        tool: String,
        /// Exit code, `None` if terminated by a signal
        code: Option<i32>,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Transport-level HTTP failure (DNS, connect, timeout, body read)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Writing the destination file failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}
