//! Serialized, durable download log
//!
//! Every entry is written as one line under an exclusive lock and synced to stable
//! storage before the lock is released, so entries from concurrent workers never
//! interleave and survive a crash right after `append` returns.

use crate::error::{Error, Result};
use crate::types::LogEntry;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// ctime-style timestamp, e.g. `Mon Oct 19 14:03:07 2026`
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Append-only writer for the download log
#[derive(Debug)]
pub struct LogWriter {
    path: PathBuf,
    /// `None` once the log has been closed
    file: Mutex<Option<File>>,
}

impl LogWriter {
    /// Open (or create) the log file in append mode
    ///
    /// Missing parent directories are created. Any failure here is a fatal startup
    /// error for the coordinator.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::LogOpen {
                    path: path.clone(),
                    source,
                })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| Error::LogOpen {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Download log opened");

        Ok(Self {
            path,
            file: Mutex::new(Some(file)),
        })
    }

    /// Path of the underlying log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and force it to stable storage
    ///
    /// The lock is held from timestamping until the sync completes, so on-disk order
    /// matches timestamp order. The guard is released on every return path.
    pub async fn append(&self, entry: &LogEntry) -> Result<()> {
        let mut guard = self.file.lock().await;
        let file = guard.as_mut().ok_or(Error::LogClosed)?;

        let line = format_line(entry, &Local::now());
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| Error::LogWrite { source })?;
        file.flush()
            .await
            .map_err(|source| Error::LogWrite { source })?;
        file.sync_data()
            .await
            .map_err(|source| Error::LogWrite { source })?;

        Ok(())
    }

    /// Flush, sync and release the file handle
    ///
    /// Later appends fail with [`Error::LogClosed`]. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        let mut guard = self.file.lock().await;
        if let Some(mut file) = guard.take() {
            file.flush()
                .await
                .map_err(|source| Error::LogWrite { source })?;
            file.sync_all()
                .await
                .map_err(|source| Error::LogWrite { source })?;
            tracing::debug!(path = %self.path.display(), "Download log closed");
        }
        Ok(())
    }

    /// Whether [`close`](Self::close) has run
    pub async fn is_closed(&self) -> bool {
        self.file.lock().await.is_none()
    }
}

/// Render `[<timestamp>] <entry>\n`
pub(crate) fn format_line(entry: &LogEntry, now: &DateTime<Local>) -> String {
    format!("[{}] {}\n", now.format(TIMESTAMP_FORMAT), entry)
}
