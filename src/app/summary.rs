use std::collections::BTreeMap;

use serde::Serialize;

use crate::metrics::StressSummary;
use crate::stress::FinishReason;

use super::format::{Palette, duration_micros, format_duration, format_x100};

/// Machine-readable stress summary. Durations are in microseconds.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(super) struct SummaryJson {
    pub(super) finish_reason: &'static str,
    pub(super) total_requests: u64,
    pub(super) completed_requests: u64,
    pub(super) failed_requests: u64,
    pub(super) total_time_us: u64,
    pub(super) avg_first_byte_us: Option<u64>,
    pub(super) min_first_byte_us: Option<u64>,
    pub(super) max_first_byte_us: Option<u64>,
    pub(super) requests_per_sec_x100: u64,
    pub(super) status_counts: BTreeMap<u16, u64>,
}

impl SummaryJson {
    pub(super) fn new(summary: &StressSummary, reason: FinishReason) -> Self {
        Self {
            finish_reason: reason_key(reason),
            total_requests: summary.total_requests,
            completed_requests: summary.completed_requests,
            failed_requests: summary.failed_requests,
            total_time_us: duration_micros(summary.total_time),
            avg_first_byte_us: summary.first_byte.map(|stats| duration_micros(stats.avg)),
            min_first_byte_us: summary.first_byte.map(|stats| duration_micros(stats.min)),
            max_first_byte_us: summary.first_byte.map(|stats| duration_micros(stats.max)),
            requests_per_sec_x100: summary.requests_per_sec_x100,
            status_counts: summary.status_counts.clone(),
        }
    }
}

const fn reason_key(reason: FinishReason) -> &'static str {
    match reason {
        FinishReason::QuotaExhausted => "quota_exhausted",
        FinishReason::Deadline => "deadline",
        FinishReason::Interrupted => "interrupted",
    }
}

pub(super) fn stress_summary_lines(
    summary: &StressSummary,
    reason: FinishReason,
    palette: Palette,
) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        palette.label(&format!("Stress test finished ({})", reason)),
        format!("Total Requests: {}", summary.total_requests),
        format!("Completed: {}", summary.completed_requests),
        format!("Failed: {}", summary.failed_requests),
        format!("Total Time: {}", format_duration(summary.total_time)),
        format!("Requests/sec: {}", format_x100(summary.requests_per_sec_x100)),
    ];

    match summary.first_byte {
        Some(stats) => {
            lines.push(format!("Avg First Byte: {}", format_duration(stats.avg)));
            lines.push(format!("Min First Byte: {}", format_duration(stats.min)));
            lines.push(format!("Max First Byte: {}", format_duration(stats.max)));
        }
        None => lines.push("First Byte: no data (no request completed)".to_owned()),
    }

    if !summary.status_counts.is_empty() {
        lines.push("Status Codes:".to_owned());
        for (status, count) in &summary.status_counts {
            let status = http::StatusCode::from_u16(*status)
                .map_or_else(|_| status.to_string(), |code| palette.status(code));
            lines.push(format!("  {}: {}", status, count));
        }
    }
    lines
}
