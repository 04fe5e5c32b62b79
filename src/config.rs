//! Configuration types for url-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which fetch collaborator performs the transfers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetcherKind {
    /// Use `curl` if it is on PATH, otherwise the native HTTP client (default)
    #[default]
    Auto,
    /// Always shell out to `curl`
    Curl,
    /// Always use the native HTTP client
    Http,
}

/// Main configuration for DownloadCoordinator
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Download log file, opened in append mode (default: "download_log.txt")
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Directory downloaded files are written to (default: ".")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Prefix of every destination filename, followed by the ticket (default: "image_")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Extension used when the URL has none (default: "bin", empty = no extension)
    #[serde(default = "default_fallback_extension")]
    pub fallback_extension: String,

    /// Fetch collaborator selection
    #[serde(default)]
    pub fetcher: FetcherKind,

    /// Path to the curl executable (auto-detected if None)
    #[serde(default)]
    pub curl_path: Option<PathBuf>,

    /// Per-transfer time limit for either fetcher (default: 300 seconds)
    #[serde(default = "default_http_timeout", with = "duration_serde")]
    pub http_timeout: Duration,

    /// Wait for in-flight downloads during shutdown (default: true)
    #[serde(default = "default_true")]
    pub wait_for_pending: bool,

    /// Upper bound on the shutdown drain (None = wait until every download finishes
    /// or `http_timeout` expires)
    #[serde(default, with = "optional_duration_serde")]
    pub shutdown_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            download_dir: default_download_dir(),
            file_prefix: default_file_prefix(),
            fallback_extension: default_fallback_extension(),
            fetcher: FetcherKind::default(),
            curl_path: None,
            http_timeout: default_http_timeout(),
            wait_for_pending: true,
            shutdown_timeout: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields take their default values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read config file '{}': {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail later in surprising ways
    pub fn validate(&self) -> Result<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "log path must not be empty".into(),
                key: Some("log_path".into()),
            });
        }

        if self.file_prefix.contains(['/', '\\']) {
            return Err(Error::Config {
                message: format!(
                    "file prefix '{}' must not contain path separators",
                    self.file_prefix
                ),
                key: Some("file_prefix".into()),
            });
        }

        if !self
            .fallback_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
        {
            return Err(Error::Config {
                message: format!(
                    "fallback extension '{}' must be alphanumeric",
                    self.fallback_extension
                ),
                key: Some("fallback_extension".into()),
            });
        }

        Ok(())
    }
}

// Default value functions
fn default_log_path() -> PathBuf {
    PathBuf::from("download_log.txt")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "image_".to_string()
}

fn default_fallback_extension() -> String {
    "bin".to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (as seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
