//! Download ticket generation

use crate::types::DownloadTicket;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out strictly increasing download tickets, starting at 1
///
/// Lock-free and safe to call from any number of tasks at once. The counter lives
/// only as long as the owning coordinator; a new run starts again at 1.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    issued: AtomicU64,
}

impl SequenceCounter {
    /// Create a counter whose first ticket is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket
    pub fn next(&self) -> DownloadTicket {
        DownloadTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Number of tickets issued so far
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}
