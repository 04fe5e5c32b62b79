//! Fetch collaborators
//!
//! The coordinator never performs transfers itself; it hands each URL and its
//! destination path to a [`Fetcher`]. Two implementations are provided:
//!
//! - [`CurlFetcher`]: shells out to the `curl` binary
//! - [`HttpFetcher`]: native HTTP(S) client
//!
//! [`from_config`] picks one according to [`Config::fetcher`](crate::Config::fetcher).

mod curl;
mod http;
mod traits;

pub use curl::CurlFetcher;
pub use http::HttpFetcher;
pub use traits::Fetcher;

use crate::config::{Config, FetcherKind};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Build the fetcher selected by the configuration
///
/// `http_timeout` bounds every transfer, whichever fetcher is chosen.
///
/// - `Curl` uses `curl_path` if set, otherwise searches PATH and fails if curl is missing
/// - `Http` always uses the native client
/// - `Auto` prefers curl (explicit path, then PATH) and falls back to the native client
pub fn from_config(config: &Config) -> Result<Arc<dyn Fetcher>> {
    let curl = config
        .curl_path
        .clone()
        .map(CurlFetcher::new)
        .or_else(CurlFetcher::from_path)
        .map(|curl| curl.with_max_time(config.http_timeout));

    let fetcher: Arc<dyn Fetcher> = match (config.fetcher, curl) {
        (FetcherKind::Curl | FetcherKind::Auto, Some(curl)) => Arc::new(curl),
        (FetcherKind::Curl, None) => {
            return Err(Error::Config {
                message: "curl fetcher selected but curl was not found in PATH".into(),
                key: Some("curl_path".into()),
            });
        }
        (FetcherKind::Http | FetcherKind::Auto, _) => Arc::new(native(config)?),
    };

    tracing::info!(fetcher = fetcher.name(), "Fetcher initialized");
    Ok(fetcher)
}

fn native(config: &Config) -> Result<HttpFetcher> {
    HttpFetcher::new(config.http_timeout).map_err(|e| Error::Config {
        message: format!("failed to create HTTP client: {}", e),
        key: Some("http_timeout".into()),
    })
}

/// Sibling file a transfer is written to before being renamed to `destination`
pub(crate) fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
