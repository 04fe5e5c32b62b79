//! Operator input loop
//!
//! Reads one URL per line, submits each to the coordinator and shuts it down when
//! the operator types `exit`, input ends, or a termination signal arrives. A second
//! signal during shutdown stops waiting for in-flight downloads.

use crate::coordinator::DownloadCoordinator;
use crate::error::Result;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Command that ends the input loop
pub const EXIT_COMMAND: &str = "exit";

/// Meaning of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// A URL to download
    Url(String),
    /// The exit command
    Exit,
    /// Blank line, ignored
    Blank,
}

impl InputLine {
    /// Classify a raw line (surrounding whitespace is ignored)
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            InputLine::Blank
        } else if line == EXIT_COMMAND {
            InputLine::Exit
        } else {
            InputLine::Url(line.to_string())
        }
    }
}

/// Why the input loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Operator typed `exit`
    ExitCommand,
    /// Input stream reached EOF
    EndOfInput,
    /// Termination signal received
    Signal,
}

/// Outcome of an input session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// URLs handed to the coordinator
    pub submitted: usize,
    /// Lines the coordinator refused
    pub rejected: usize,
    /// What ended the loop
    pub ended_by: SessionEnd,
}

/// Feed `input` to `coordinator` until exit, EOF or a stop request, then shut down
///
/// `stop` produces a future that resolves on a stop request; it is usually
/// [`wait_for_signal`](crate::wait_for_signal). It is called once for the input
/// loop and once more while shutdown drains: a second request abandons in-flight
/// downloads so the log can be closed.
///
/// Lines that are not valid UTF-8 are skipped and counted as rejected.
///
/// # Errors
///
/// Returns an error if reading input fails or if the coordinator fails to close
/// its log during shutdown. The coordinator is shut down in both cases.
pub async fn run_session<R, F, S>(
    mut input: R,
    coordinator: &DownloadCoordinator,
    mut stop: F,
) -> Result<SessionSummary>
where
    R: AsyncBufRead + Unpin,
    F: FnMut() -> S,
    S: Future<Output = ()>,
{
    let mut submitted = 0;
    let mut rejected = 0;
    let mut buf = Vec::new();

    let ended_by = {
        let first_stop = stop();
        tokio::pin!(first_stop);

        loop {
            buf.clear();
            let read = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => read,
                _ = &mut first_stop => break Ok(SessionEnd::Signal),
            };

            match read {
                Ok(0) => break Ok(SessionEnd::EndOfInput),
                Ok(_) => {}
                Err(e) => break Err(e),
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    let lossy = String::from_utf8_lossy(&buf);
                    tracing::warn!(
                        line = %lossy.trim_end(),
                        error = %e,
                        "Skipping input line that is not valid UTF-8"
                    );
                    rejected += 1;
                    continue;
                }
            };

            match InputLine::parse(line) {
                InputLine::Blank => continue,
                InputLine::Exit => break Ok(SessionEnd::ExitCommand),
                InputLine::Url(url) => match coordinator.submit(&url) {
                    Ok(()) => submitted += 1,
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "Download not submitted");
                        rejected += 1;
                    }
                },
            }
        }
    };

    let shutdown = coordinator.shutdown();
    tokio::pin!(shutdown);
    let second_stop = stop();
    tokio::pin!(second_stop);
    let shutdown_result = tokio::select! {
        result = &mut shutdown => result,
        _ = &mut second_stop => {
            coordinator.abandon_pending();
            shutdown.await
        }
    };

    let ended_by = ended_by?;
    shutdown_result?;

    tracing::info!(submitted, rejected, ended_by = ?ended_by, "Input session finished");
    Ok(SessionSummary {
        submitted,
        rejected,
        ended_by,
    })
}
