//! # url-dl
//!
//! Concurrent URL downloader with a durable, append-only download log.
//!
//! Every submitted URL gets its own task and a unique, strictly increasing ticket.
//! Each download's lifecycle is appended to a log file as timestamped lines:
//!
//! ```text
//! [Mon Oct 19 14:03:07 2026] Download 1 started for: http://example.com/a.png
//! [Mon Oct 19 14:03:08 2026] Download 1 completed: ./image_1.png
//! ```
//!
//! Log writes are serialized and synced to disk before the next writer proceeds.
//! Transfers are delegated to a pluggable [`Fetcher`](fetch::Fetcher).
//!
//! ## Quick Start
//!
//! ```no_run
//! use url_dl::{Config, DownloadCoordinator, fetch};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = fetch::from_config(&config)?;
//!     let coordinator = DownloadCoordinator::start(config, fetcher).await?;
//!
//!     coordinator.submit("https://www.rust-lang.org/static/images/rust-logo-blk.svg")?;
//!
//!     // Waits for in-flight downloads, then closes the log
//!     coordinator.shutdown().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Download coordinator
pub mod coordinator;
/// Error types
pub mod error;
/// Fetch collaborators (curl, native HTTP)
pub mod fetch;
/// Durable download log
pub mod log_writer;
/// Ticket generation
pub mod sequence;
/// Operator input loop
pub mod session;
/// Core types and events
pub mod types;
/// Destination path helpers
pub mod utils;
/// Per-URL download worker
pub mod worker;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, FetcherKind};
pub use coordinator::DownloadCoordinator;
pub use error::{Error, FetchError, Result};
pub use fetch::Fetcher;
pub use log_writer::LogWriter;
pub use sequence::SequenceCounter;
pub use session::{SessionEnd, SessionSummary, run_session};
pub use types::{CoordinatorState, DownloadTicket, EntryStatus, Event, LogEntry};
pub use worker::FetchWorker;

/// Resolve on the next SIGINT or SIGTERM
///
/// Each call registers fresh listeners, so calling it again after it resolved waits
/// for a further signal. [`run_session`] relies on this to treat a second Ctrl+C
/// during shutdown as a request to stop waiting for in-flight downloads. If neither
/// listener can be registered, falls back to `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{Signal, SignalKind, signal};

    fn listen(kind: SignalKind, name: &'static str) -> Option<Signal> {
        signal(kind)
            .inspect_err(|e| tracing::warn!(signal = name, error = %e, "Could not listen for signal"))
            .ok()
    }

    let received = match (
        listen(SignalKind::interrupt(), "SIGINT"),
        listen(SignalKind::terminate(), "SIGTERM"),
    ) {
        (Some(mut sigint), Some(mut sigterm)) => tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        },
        (Some(mut sigint), None) => {
            sigint.recv().await;
            "SIGINT"
        }
        (None, Some(mut sigterm)) => {
            sigterm.recv().await;
            "SIGTERM"
        }
        (None, None) => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "No stop signal can be received");
                std::future::pending::<()>().await;
            }
            "ctrl_c"
        }
    };

    tracing::info!(signal = received, "Stop requested");
}

/// Resolve on the next Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!(signal = "ctrl_c", "Stop requested");
}
