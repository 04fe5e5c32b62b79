//! Native HTTP fetcher built on reqwest

use super::partial_path;
use super::traits::Fetcher;
use crate::error::FetchError;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Fetcher that downloads over HTTP(S) with a shared `reqwest::Client`
///
/// The body is streamed into `<destination>.part` and renamed into place only after
/// the whole response was written and synced, so `destination` exists only when the
/// fetch succeeded.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("url-dl/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    async fn download_to(
        &self,
        url: &str,
        destination: &Path,
        partial: &Path,
    ) -> Result<(), FetchError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let write_err = |source: std::io::Error| FetchError::Write {
            path: partial.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(partial).await.map_err(write_err)?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(write_err)?;
        }
        file.flush().await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        tokio::fs::rename(partial, destination)
            .await
            .map_err(|source| FetchError::Write {
                path: destination.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        let partial = partial_path(destination);
        let result = self.download_to(url, destination, &partial).await;

        if result.is_err() {
            // Best effort: the partial file may never have been created
            let _ = tokio::fs::remove_file(&partial).await;
        }
        result
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
