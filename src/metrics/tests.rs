use std::time::Duration;

use http::StatusCode;
use tokio::time::Instant;

use super::*;
use crate::error::{AppError, AppResult};
use crate::http::{PhaseTimings, RequestSample, RequestTimings};

fn completed(seq: u64, status: u16, first_byte_ms: u64) -> AppResult<RequestRecord> {
    let status = StatusCode::from_u16(status)
        .map_err(|err| AppError::validation(format!("Invalid status: {}", err)))?;
    Ok(RequestRecord {
        seq,
        worker: 0,
        finished_after: Duration::from_millis(first_byte_ms),
        outcome: RequestOutcome::Completed(RequestSample {
            status,
            timings: RequestTimings {
                started_at: Instant::now(),
                phases: PhaseTimings::default(),
                first_byte: Duration::from_millis(first_byte_ms),
            },
        }),
    })
}

fn failed(seq: u64) -> RequestRecord {
    RequestRecord {
        seq,
        worker: 1,
        finished_after: Duration::from_millis(5),
        outcome: RequestOutcome::Failed {
            error: "connection refused".to_owned(),
        },
    }
}

#[test]
fn summarize_empty_set_reports_no_data() -> AppResult<()> {
    let records: Vec<RequestRecord> = Vec::new();
    let summary = summarize(&records, Duration::from_secs(2));
    if !summary.is_empty() || summary.completed_requests != 0 || summary.failed_requests != 0 {
        return Err(AppError::validation("Expected zero counts"));
    }
    if summary.first_byte.is_some() {
        return Err(AppError::validation("Expected no first-byte stats"));
    }
    if summary.requests_per_sec_x100 != 0 || !summary.status_counts.is_empty() {
        return Err(AppError::validation("Expected zero rate and no statuses"));
    }
    if summary.total_time != Duration::from_secs(2) {
        return Err(AppError::validation("Expected wall time to be kept"));
    }
    Ok(())
}

#[test]
fn summarize_only_failures_has_no_first_byte() -> AppResult<()> {
    let records = [failed(0), failed(1)];
    let summary = summarize(&records, Duration::from_secs(1));
    if summary.total_requests != 2 || summary.failed_requests != 2 {
        return Err(AppError::validation("Expected two failed requests"));
    }
    if summary.first_byte.is_some() {
        return Err(AppError::validation("Expected no first-byte stats"));
    }
    Ok(())
}

#[test]
fn summarize_computes_first_byte_stats_and_statuses() -> AppResult<()> {
    let records = [
        completed(0, 200, 10)?,
        completed(1, 200, 30)?,
        completed(2, 503, 20)?,
        failed(3),
    ];
    let summary = summarize(&records, Duration::from_secs(2));

    if summary.total_requests != 4 || summary.completed_requests != 3 {
        return Err(AppError::validation("Unexpected counts"));
    }
    let stats = summary
        .first_byte
        .ok_or_else(|| AppError::validation("Expected first-byte stats"))?;
    if stats.avg != Duration::from_millis(20)
        || stats.min != Duration::from_millis(10)
        || stats.max != Duration::from_millis(30)
    {
        return Err(AppError::validation(format!("Unexpected stats: {:?}", stats)));
    }
    if summary.status_counts.get(&200) != Some(&2) || summary.status_counts.get(&503) != Some(&1) {
        return Err(AppError::validation("Unexpected status counts"));
    }
    if summary.requests_per_sec_x100 != 200 {
        return Err(AppError::validation(format!(
            "Expected 2.00 req/s, got x100={}",
            summary.requests_per_sec_x100
        )));
    }
    Ok(())
}

#[test]
fn summarize_rate_survives_zero_wall_time() -> AppResult<()> {
    let records = [completed(0, 200, 1)?];
    let summary = summarize(&records, Duration::ZERO);
    if summary.requests_per_sec_x100 != 100_000 {
        return Err(AppError::validation("Expected rate over a 1ms floor"));
    }
    Ok(())
}
