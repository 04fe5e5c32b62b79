//! Shared test helpers: a scripted fetcher and log readers.

use crate::config::Config;
use crate::coordinator::DownloadCoordinator;
use crate::error::FetchError;
use crate::fetch::Fetcher;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

/// Fetcher that never touches the network
///
/// URLs containing any of the configured failure markers fail; everything else
/// succeeds and writes a small file to the destination, like a real fetcher would.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    fail_markers: Vec<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl FakeFetcher {
    pub(crate) fn succeeding() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on<const N: usize>(markers: [&str; N]) -> Self {
        Self {
            fail_markers: markers.iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_markers.iter().any(|m| url.contains(m.as_str())) {
            return Err(FetchError::ToolFailed {
                tool: "fake".into(),
                code: Some(6),
            });
        }

        tokio::fs::write(destination, url.as_bytes())
            .await
            .map_err(|source| FetchError::Write {
                path: destination.to_path_buf(),
                source,
            })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Config rooted in a fresh temp dir. Keep the TempDir alive for the test.
pub(crate) fn test_config() -> (Config, TempDir) {
    let dir = tempdir().unwrap();
    let config = Config {
        log_path: dir.path().join("download_log.txt"),
        download_dir: dir.path().join("downloads"),
        ..Default::default()
    };
    (config, dir)
}

/// Start a coordinator on a temp dir with the given fake fetcher
pub(crate) async fn create_test_coordinator(
    fetcher: Arc<FakeFetcher>,
) -> (DownloadCoordinator, TempDir) {
    let (config, dir) = test_config();
    let coordinator = DownloadCoordinator::start(config, fetcher).await.unwrap();
    (coordinator, dir)
}

/// All lines of a log file (empty if the file does not exist)
pub(crate) fn read_log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
