//! Fetcher backed by the external `curl` binary

use super::partial_path;
use super::traits::Fetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Fetcher that runs `curl -s -f [--max-time <secs>] -o <destination>.part <url>`
///
/// `-f` makes curl exit non-zero on HTTP error responses instead of saving the
/// error page as if it were the requested file. The transfer lands in a `.part`
/// file that is renamed into place on success and removed on failure.
pub struct CurlFetcher {
    binary_path: PathBuf,
    max_time: Option<Duration>,
}

impl CurlFetcher {
    /// Create a fetcher with an explicit binary path and no transfer time limit
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            max_time: None,
        }
    }

    /// Abort transfers that take longer than `max_time` (rounded up to whole seconds)
    pub fn with_max_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Attempt to find curl in PATH
    ///
    /// # Returns
    ///
    /// `Some(CurlFetcher)` if the binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("curl").ok().map(Self::new)
    }

    /// Path of the binary this fetcher invokes
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, url: &str, output: &Path) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.arg("-s").arg("-f");
        if let Some(max_time) = self.max_time {
            let secs = max_time.as_secs() + u64::from(max_time.subsec_nanos() > 0);
            cmd.arg("--max-time").arg(secs.max(1).to_string());
        }
        cmd.arg("-o")
            .arg(output)
            .arg(url)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        cmd
    }
}

impl CurlFetcher {
    async fn download_to(
        &self,
        url: &str,
        destination: &Path,
        partial: &Path,
    ) -> Result<(), FetchError> {
        let status = self
            .command(url, partial)
            .status()
            .await
            .map_err(|source| FetchError::ToolUnavailable {
                tool: self.binary_path.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(FetchError::ToolFailed {
                tool: self.binary_path.display().to_string(),
                code: status.code(),
            });
        }

        tokio::fs::rename(partial, destination)
            .await
            .map_err(|source| FetchError::Write {
                path: destination.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl Fetcher for CurlFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        let partial = partial_path(destination);
        let result = self.download_to(url, destination, &partial).await;

        if result.is_err() {
            // curl leaves whatever it received before failing
            let _ = tokio::fs::remove_file(&partial).await;
        }
        result
    }

    fn name(&self) -> &'static str {
        "curl"
    }
}
