//! Trait for the fetch collaborator

use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Path;

/// Transfers one URL to a local file
///
/// Implementations may shell out to an external tool or use a native client. On
/// success the file at `destination` holds the downloaded content; on failure the
/// caller records the download as failed and moves on.
///
/// # Examples
///
/// ```no_run
/// use url_dl::fetch::{CurlFetcher, Fetcher};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = CurlFetcher::from_path().expect("curl not found");
/// fetcher
///     .fetch("https://example.com/logo.png", Path::new("image_1.png"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `destination`
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the transfer could not be completed. No retries
    /// are attempted.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
