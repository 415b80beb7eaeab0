use std::fmt;
use std::sync::Arc;

use super::Target;

/// How a single poll of a single target ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Page fetched and scanned. `status` is the HTTP status of the page.
    Scanned { status: u16 },
    FetchFailed(String),
    ScanFailed(String),
    Cancelled,
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Scanned { status } => write!(f, "scanned (HTTP {status})"),
            PollOutcome::FetchFailed(e) => write!(f, "fetch failed: {e}"),
            PollOutcome::ScanFailed(e) => write!(f, "scan failed: {e}"),
            PollOutcome::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of one poll of one target. Any failure reports zero matches.
#[derive(Clone, Debug)]
pub struct PollResult {
    pub target: Arc<Target>,
    pub match_count: usize,
    pub outcome: PollOutcome,
}

impl PollResult {
    pub fn scanned(target: Arc<Target>, status: u16, match_count: usize) -> Self {
        Self {
            target,
            match_count,
            outcome: PollOutcome::Scanned { status },
        }
    }

    pub fn failed(target: Arc<Target>, outcome: PollOutcome) -> Self {
        Self {
            target,
            match_count: 0,
            outcome,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.match_count > 0
    }
}
