//! Core types for url-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Unique identifier for one download attempt
///
/// Tickets start at 1 and strictly increase for the lifetime of a
/// [`DownloadCoordinator`](crate::DownloadCoordinator).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadTicket(pub u64);

impl DownloadTicket {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DownloadTicket {
    fn from(ticket: u64) -> Self {
        Self(ticket)
    }
}

impl From<DownloadTicket> for u64 {
    fn from(ticket: DownloadTicket) -> Self {
        ticket.0
    }
}

impl PartialEq<u64> for DownloadTicket {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for DownloadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle stage recorded in the download log
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    /// Worker picked up the URL
    Started {
        /// Source URL
        url: String,
    },
    /// Fetch succeeded and the file is at `path`
    Completed {
        /// Destination file
        path: PathBuf,
    },
    /// Fetch failed
    Failed {
        /// Source URL
        url: String,
    },
}

/// A single line of the download log, without its timestamp
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Download this entry belongs to
    pub ticket: DownloadTicket,
    /// What happened
    pub status: EntryStatus,
}

impl LogEntry {
    /// Entry recorded when a worker starts
    pub fn started(ticket: DownloadTicket, url: impl Into<String>) -> Self {
        Self {
            ticket,
            status: EntryStatus::Started { url: url.into() },
        }
    }

    /// Entry recorded after a successful fetch
    pub fn completed(ticket: DownloadTicket, path: impl Into<PathBuf>) -> Self {
        Self {
            ticket,
            status: EntryStatus::Completed { path: path.into() },
        }
    }

    /// Entry recorded after a failed fetch
    pub fn failed(ticket: DownloadTicket, url: impl Into<String>) -> Self {
        Self {
            ticket,
            status: EntryStatus::Failed { url: url.into() },
        }
    }

    /// Whether this entry ends a download's lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, EntryStatus::Started { .. })
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            EntryStatus::Started { url } => {
                write!(f, "Download {} started for: {}", self.ticket, url)
            }
            EntryStatus::Completed { path } => {
                write!(f, "Download {} completed: {}", self.ticket, path.display())
            }
            EntryStatus::Failed { url } => {
                write!(f, "Download {} failed for: {}", self.ticket, url)
            }
        }
    }
}

/// Coordinator lifecycle
///
/// There is no uninitialized state: a coordinator only exists once
/// [`DownloadCoordinator::start`](crate::DownloadCoordinator::start) succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    /// Accepting submissions
    Ready,
    /// Draining in-flight workers, submissions rejected
    ShuttingDown,
    /// Log closed, all resources released
    Closed,
}

/// Events emitted during download processing
///
/// These mirror the log entries so embedders can react without tailing the file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Worker started a download
    Started {
        /// Download ticket
        ticket: DownloadTicket,
        /// Source URL
        url: String,
    },
    /// Download finished successfully
    Completed {
        /// Download ticket
        ticket: DownloadTicket,
        /// Destination file
        path: PathBuf,
    },
    /// Download failed
    Failed {
        /// Download ticket
        ticket: DownloadTicket,
        /// Source URL
        url: String,
        /// Error message
        error: String,
    },
    /// Coordinator finished shutting down
    Shutdown,
}
