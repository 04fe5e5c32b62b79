//! Shutdown coordination.

use crate::error::Result;
use crate::types::{CoordinatorState, Event};

use super::DownloadCoordinator;

impl DownloadCoordinator {
    /// Shut the coordinator down and release its resources
    ///
    /// Shutdown sequence:
    /// 1. Stop accepting new downloads (`Ready -> ShuttingDown`)
    /// 2. Wait for in-flight downloads, unless `wait_for_pending` is disabled, bounded
    ///    by `shutdown_timeout` when set
    /// 3. Flush, sync and close the download log
    /// 4. Enter `Closed` and emit [`Event::Shutdown`]
    ///
    /// Downloads still running after step 2 are abandoned; their remaining log
    /// writes fail with `LogClosed` and are reported through tracing.
    ///
    /// Calling this again after shutdown has begun is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush of the download log fails. The
    /// coordinator still ends up `Closed` and the file handle is released.
    pub async fn shutdown(&self) -> Result<()> {
        {
            let mut state = self.lock_state();
            if *state != CoordinatorState::Ready {
                tracing::debug!(state = ?*state, "Shutdown already in progress");
                return Ok(());
            }
            *state = CoordinatorState::ShuttingDown;
        }
        tracing::info!(pending = self.tracker.len(), "Initiating shutdown");

        self.tracker.close();

        if self.worker.config.wait_for_pending {
            self.drain().await;
        } else if !self.tracker.is_empty() {
            tracing::warn!(
                abandoned = self.tracker.len(),
                "Not waiting for in-flight downloads; their outcome may never be logged"
            );
        }

        let close_result = self.worker.log.close().await;
        *self.lock_state() = CoordinatorState::Closed;
        self.worker.event_tx.send(Event::Shutdown).ok();

        match close_result {
            Ok(()) => {
                tracing::info!(
                    tickets_issued = self.worker.counter.issued(),
                    "Shutdown complete"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to close download log during shutdown");
                Err(e)
            }
        }
    }

    /// Stop waiting for in-flight downloads
    ///
    /// A shutdown that is draining (or starts draining later) proceeds to close the
    /// log right away. Downloads still running are abandoned.
    pub fn abandon_pending(&self) {
        if !self.abandon.is_cancelled() {
            tracing::warn!(
                pending = self.tracker.len(),
                "Abandoning in-flight downloads"
            );
            self.abandon.cancel();
        }
    }

    /// Wait for tracked workers, honouring `shutdown_timeout` and `abandon_pending`
    async fn drain(&self) {
        if self.tracker.is_empty() {
            return;
        }
        tracing::info!(
            pending = self.tracker.len(),
            "Waiting for in-flight downloads to finish"
        );

        let bounded = async {
            match self.worker.config.shutdown_timeout {
                Some(timeout) => {
                    let finished = tokio::time::timeout(timeout, self.tracker.wait())
                        .await
                        .is_ok();
                    if !finished {
                        tracing::warn!(
                            abandoned = self.tracker.len(),
                            timeout_secs = timeout.as_secs_f64(),
                            "Timeout waiting for downloads to complete, proceeding with shutdown"
                        );
                    }
                    finished
                }
                None => {
                    self.tracker.wait().await;
                    true
                }
            }
        };

        let finished = tokio::select! {
            finished = bounded => finished,
            _ = self.abandon.cancelled() => {
                tracing::warn!(
                    abandoned = self.tracker.len(),
                    "Drain cut short, proceeding with shutdown"
                );
                false
            }
        };

        if finished {
            tracing::info!("All in-flight downloads finished");
        }
    }
}
