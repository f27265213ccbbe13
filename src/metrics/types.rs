use std::collections::BTreeMap;
use std::time::Duration;

use crate::http::RequestSample;

/// Result of one request issued during a session.
#[derive(Debug, Clone)]
pub enum RequestOutcome {
    Completed(RequestSample),
    Failed { error: String },
}

impl RequestOutcome {
    #[must_use]
    pub const fn sample(&self) -> Option<&RequestSample> {
        match self {
            RequestOutcome::Completed(sample) => Some(sample),
            RequestOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, RequestOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct RequestRecord {
    /// Claim order within the session, starting at 0.
    pub seq: u64,
    pub worker: usize,
    /// Offset from session start at which the request finished.
    pub finished_after: Duration,
    pub outcome: RequestOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstByteStats {
    pub avg: Duration,
    pub min: Duration,
    pub max: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressSummary {
    pub total_requests: u64,
    pub completed_requests: u64,
    pub failed_requests: u64,
    pub total_time: Duration,
    /// `None` when no request completed.
    pub first_byte: Option<FirstByteStats>,
    pub status_counts: BTreeMap<u16, u64>,
    pub requests_per_sec_x100: u64,
}

impl StressSummary {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_requests == 0
    }
}
