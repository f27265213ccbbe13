use std::collections::BTreeMap;
use std::time::Duration;

use super::types::{FirstByteStats, RequestRecord, StressSummary};

/// Folds a finished result set into a summary.
///
/// Integer-only; an empty or all-failed set yields `first_byte: None`
/// instead of dividing by zero.
#[must_use]
pub fn summarize<'rec, I>(records: I, total_time: Duration) -> StressSummary
where
    I: IntoIterator<Item = &'rec RequestRecord>,
{
    let mut total_requests: u64 = 0;
    let mut failed_requests: u64 = 0;
    let mut completed_requests: u64 = 0;
    let mut first_byte_sum_ns: u128 = 0;
    let mut min = Duration::MAX;
    let mut max = Duration::ZERO;
    let mut status_counts: BTreeMap<u16, u64> = BTreeMap::new();

    for record in records {
        total_requests = total_requests.saturating_add(1);
        let Some(sample) = record.outcome.sample() else {
            failed_requests = failed_requests.saturating_add(1);
            continue;
        };
        completed_requests = completed_requests.saturating_add(1);
        let first_byte = sample.timings.first_byte;
        first_byte_sum_ns = first_byte_sum_ns.saturating_add(first_byte.as_nanos());
        min = min.min(first_byte);
        max = max.max(first_byte);
        let count = status_counts.entry(sample.status.as_u16()).or_insert(0);
        *count = count.saturating_add(1);
    }

    let first_byte = first_byte_sum_ns
        .checked_div(u128::from(completed_requests))
        .map(|avg_ns| FirstByteStats {
            avg: Duration::from_nanos(u64::try_from(avg_ns).unwrap_or(u64::MAX)),
            min,
            max,
        });

    StressSummary {
        total_requests,
        completed_requests,
        failed_requests,
        total_time,
        first_byte,
        status_counts,
        requests_per_sec_x100: requests_per_sec_x100(total_requests, total_time),
    }
}

fn requests_per_sec_x100(total_requests: u64, total_time: Duration) -> u64 {
    if total_requests == 0 {
        return 0;
    }
    let duration_ms = total_time.as_millis().max(1);
    let scaled = u128::from(total_requests)
        .saturating_mul(100_000)
        .checked_div(duration_ms)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
