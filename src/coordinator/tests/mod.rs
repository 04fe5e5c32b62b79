use super::*;
use crate::test_helpers::{FakeFetcher, create_test_coordinator, read_log_lines, test_config};
use std::collections::HashMap;
use std::time::Duration;

mod lifecycle;

/// Per-ticket counts of (started, terminal) log lines
fn tally_by_ticket(lines: &[String]) -> HashMap<u64, (usize, usize)> {
    let mut tally: HashMap<u64, (usize, usize)> = HashMap::new();
    for line in lines {
        let (_, rest) = line.split_once("] Download ").expect("malformed log line");
        let (ticket, status) = rest.split_once(' ').expect("missing status");
        let entry = tally.entry(ticket.parse().expect("ticket")).or_default();
        if status.starts_with("started for: ") {
            entry.0 += 1;
        } else if status.starts_with("completed: ") || status.starts_with("failed for: ") {
            entry.1 += 1;
        } else {
            panic!("unknown status in line: {line}");
        }
    }
    tally
}
