//! Download coordinator split into focused submodules.
//!
//! The `DownloadCoordinator` owns every shared resource (ticket counter, download
//! log, fetcher, task set) and hands each submitted URL to its own
//! [`FetchWorker`]. Methods are organized by concern:
//! - this module - startup, submission and accessors
//! - [`lifecycle`] - shutdown and draining of in-flight downloads

mod lifecycle;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::log_writer::LogWriter;
use crate::sequence::SequenceCounter;
use crate::types::{CoordinatorState, Event};
use crate::worker::FetchWorker;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Accepts URLs and runs one concurrent download per URL (cloneable - all fields are shared)
///
/// There is no concurrency cap, queue or admission control: every successful
/// [`submit`](Self::submit) spawns a task immediately. Spawned tasks are tracked so
/// [`shutdown`](Self::shutdown) can wait for them instead of abandoning them.
#[derive(Clone)]
pub struct DownloadCoordinator {
    /// Shared state handed to every worker
    pub(crate) worker: FetchWorker,
    /// Lifecycle state; held across the check-and-spawn in `submit`
    pub(crate) state: Arc<Mutex<CoordinatorState>>,
    /// In-flight workers
    pub(crate) tracker: TaskTracker,
    /// Cancelled to cut a running shutdown drain short
    pub(crate) abandon: CancellationToken,
}

impl DownloadCoordinator {
    /// Acquire all resources and enter the `Ready` state
    ///
    /// This initializes:
    /// - The download directory (created if missing)
    /// - The download log (opened in append mode, created if missing)
    /// - The ticket counter, starting at 1
    /// - The event broadcast channel and the worker task set
    ///
    /// # Errors
    ///
    /// Any failure here is fatal. Resources acquired before the failure are released
    /// when they go out of scope.
    pub async fn start(config: Config, fetcher: Arc<dyn Fetcher>) -> Result<Self> {
        config.validate()?;

        tokio::fs::create_dir_all(&config.download_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create download directory '{}': {}",
                        config.download_dir.display(),
                        e
                    ),
                ))
            })?;

        let log = LogWriter::open(&config.log_path).await?;

        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::info!(
            log = %config.log_path.display(),
            download_dir = %config.download_dir.display(),
            fetcher = fetcher.name(),
            "Download coordinator ready"
        );

        Ok(Self {
            worker: FetchWorker::new(
                Arc::new(config),
                Arc::new(SequenceCounter::new()),
                Arc::new(log),
                fetcher,
                event_tx,
            ),
            state: Arc::new(Mutex::new(CoordinatorState::Ready)),
            tracker: TaskTracker::new(),
            abandon: CancellationToken::new(),
        })
    }

    /// Start downloading `url` in the background and return immediately
    ///
    /// Surrounding whitespace is trimmed. The outcome is only visible through the
    /// download log and [`subscribe`](Self::subscribe).
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] if `url` is blank
    /// - [`Error::ShuttingDown`] if [`shutdown`](Self::shutdown) has been called
    pub fn submit(&self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidUrl(url.to_string()));
        }

        let state = self.lock_state();
        if *state != CoordinatorState::Ready {
            tracing::warn!(url, state = ?*state, "Rejected download submitted after shutdown");
            return Err(Error::ShuttingDown);
        }

        let worker = self.worker.clone();
        let owned = url.to_string();
        self.tracker.spawn(async move {
            worker.run(owned).await;
        });
        drop(state);

        tracing::debug!(url, pending = self.tracker.len(), "Download submitted");
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> CoordinatorState {
        *self.lock_state()
    }

    /// Number of downloads still in flight
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Number of tickets issued so far
    pub fn tickets_issued(&self) -> u64 {
        self.worker.counter.issued()
    }

    /// Subscribe to download events
    ///
    /// Multiple subscribers are supported. A subscriber that falls more than
    /// 1000 events behind receives `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.worker.event_tx.subscribe()
    }

    /// Get the active configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.worker.config)
    }

    /// Path of the download log
    pub fn log_path(&self) -> &Path {
        self.worker.log.path()
    }

    /// Lock the state, recovering from poisoning (the enum cannot be left half-written)
    pub(crate) fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
