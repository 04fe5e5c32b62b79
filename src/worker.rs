//! Per-URL download worker

use crate::config::Config;
use crate::fetch::Fetcher;
use crate::log_writer::LogWriter;
use crate::sequence::SequenceCounter;
use crate::types::{DownloadTicket, Event, LogEntry};
use crate::utils::destination_path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Runs one download: ticket, `started` entry, fetch, terminal entry
///
/// Cloning is cheap; every field is shared with the coordinator. Nothing a worker
/// does can fail outward: fetch errors become `failed` entries and log write errors
/// are reported through tracing.
#[derive(Clone)]
pub struct FetchWorker {
    pub(crate) config: Arc<Config>,
    pub(crate) counter: Arc<SequenceCounter>,
    pub(crate) log: Arc<LogWriter>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl FetchWorker {
    /// Bundle the shared resources a worker needs
    pub fn new(
        config: Arc<Config>,
        counter: Arc<SequenceCounter>,
        log: Arc<LogWriter>,
        fetcher: Arc<dyn Fetcher>,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            config,
            counter,
            log,
            fetcher,
            event_tx,
        }
    }

    /// Download `url` and record its lifecycle in the log
    ///
    /// Returns the ticket assigned to this download.
    pub async fn run(&self, url: String) -> DownloadTicket {
        let ticket = self.counter.next();
        tracing::info!(ticket = ticket.get(), url = %url, "Download started");

        self.record(LogEntry::started(ticket, url.as_str())).await;
        self.emit(Event::Started {
            ticket,
            url: url.clone(),
        });

        let destination = destination_path(
            &self.config.download_dir,
            &self.config.file_prefix,
            ticket,
            &url,
            &self.config.fallback_extension,
        );

        match self.fetcher.fetch(&url, &destination).await {
            Ok(()) => {
                tracing::info!(
                    ticket = ticket.get(),
                    path = %destination.display(),
                    "Download completed"
                );
                self.record(LogEntry::completed(ticket, destination.clone()))
                    .await;
                self.emit(Event::Completed {
                    ticket,
                    path: destination,
                });
            }
            Err(e) => {
                tracing::warn!(
                    ticket = ticket.get(),
                    url = %url,
                    fetcher = self.fetcher.name(),
                    error = %e,
                    "Download failed"
                );
                self.record(LogEntry::failed(ticket, url.as_str())).await;
                self.emit(Event::Failed {
                    ticket,
                    url,
                    error: e.to_string(),
                });
            }
        }

        ticket
    }

    async fn record(&self, entry: LogEntry) {
        if let Err(e) = self.log.append(&entry).await {
            tracing::error!(
                ticket = entry.ticket.get(),
                entry = %entry,
                error = %e,
                "Failed to write download log entry"
            );
        }
    }

    fn emit(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine
        self.event_tx.send(event).ok();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FakeFetcher, read_log_lines};
    use tempfile::tempdir;

    async fn worker_with(fetcher: Arc<FakeFetcher>) -> (FetchWorker, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            log_path: dir.path().join("download_log.txt"),
            download_dir: dir.path().join("downloads"),
            ..Default::default()
        };
        std::fs::create_dir_all(&config.download_dir).unwrap();
        let log = LogWriter::open(&config.log_path).await.unwrap();
        let (event_tx, _rx) = broadcast::channel(16);
        let worker = FetchWorker::new(
            Arc::new(config),
            Arc::new(SequenceCounter::new()),
            Arc::new(log),
            fetcher,
            event_tx,
        );
        (worker, dir)
    }

    #[tokio::test]
    async fn test_successful_fetch_logs_started_and_completed() {
        let fetcher = Arc::new(FakeFetcher::succeeding());
        let (worker, dir) = worker_with(fetcher.clone()).await;

        let ticket = worker.run("http://x/a.png".into()).await;
        assert_eq!(ticket, 1);

        let lines = read_log_lines(&dir.path().join("download_log.txt"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Download 1 started for: http://x/a.png"));
        let expected = dir.path().join("downloads").join("image_1.png");
        assert!(lines[1].ends_with(&format!("] Download 1 completed: {}", expected.display())));

        assert_eq!(
            fetcher.calls(),
            vec![("http://x/a.png".to_string(), expected)]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_logs_failed_with_url() {
        let fetcher = Arc::new(FakeFetcher::failing_on(["broken"]));
        let (worker, dir) = worker_with(fetcher).await;

        worker.run("http://x/broken.jpg".into()).await;

        let lines = read_log_lines(&dir.path().join("download_log.txt"));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] Download 1 started for: http://x/broken.jpg"));
        assert!(lines[1].ends_with("] Download 1 failed for: http://x/broken.jpg"));
    }

    #[tokio::test]
    async fn test_events_mirror_log() {
        let fetcher = Arc::new(FakeFetcher::failing_on(["bad"]));
        let (worker, _dir) = worker_with(fetcher).await;
        let mut events = worker.event_tx.subscribe();

        worker.run("http://x/good.gif".into()).await;
        worker.run("http://x/bad.gif".into()).await;

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(seen.len(), 4);
        assert!(matches!(seen[0], Event::Started { ticket, .. } if ticket == 1));
        assert!(matches!(seen[1], Event::Completed { ticket, .. } if ticket == 1));
        assert!(matches!(seen[2], Event::Started { ticket, .. } if ticket == 2));
        match &seen[3] {
            Event::Failed { ticket, url, error } => {
                assert_eq!(*ticket, 2);
                assert_eq!(url, "http://x/bad.gif");
                assert!(!error.is_empty());
            }
            other => panic!("Expected Failed event, got {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_log_write_failure_does_not_abort_worker() {
        if !std::path::Path::new("/dev/full").exists() {
            println!("Skipping test: /dev/full not available");
            return;
        }
        let dir = tempdir().unwrap();
        let config = Config {
            log_path: "/dev/full".into(),
            download_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let log = LogWriter::open(&config.log_path).await.unwrap();
        let (event_tx, mut events) = broadcast::channel(16);
        let fetcher = Arc::new(FakeFetcher::succeeding());
        let worker = FetchWorker::new(
            Arc::new(config),
            Arc::new(SequenceCounter::new()),
            Arc::new(log),
            fetcher.clone(),
            event_tx,
        );

        // Every append fails with ENOSPC; the download still happens and is reported
        let ticket = worker.run("http://x/a.png".into()).await;
        assert_eq!(ticket, 1);
        assert_eq!(fetcher.calls().len(), 1);
        assert_eq!(
            std::fs::read(dir.path().join("image_1.png")).unwrap(),
            b"http://x/a.png"
        );
        assert!(matches!(events.try_recv().unwrap(), Event::Started { .. }));
        assert!(matches!(events.try_recv().unwrap(), Event::Completed { .. }));

        // The worker stays usable for the next download
        assert_eq!(worker.run("http://x/b.png".into()).await, 2);
    }

    #[tokio::test]
    async fn test_closed_log_does_not_abort_worker() {
        let fetcher = Arc::new(FakeFetcher::succeeding());
        let (worker, dir) = worker_with(fetcher.clone()).await;
        worker.log.close().await.unwrap();

        // Still fetches and returns normally even though every log write fails
        let ticket = worker.run("http://x/a.png".into()).await;
        assert_eq!(ticket, 1);
        assert_eq!(fetcher.calls().len(), 1);
        assert!(read_log_lines(&dir.path().join("download_log.txt")).is_empty());
    }
}
