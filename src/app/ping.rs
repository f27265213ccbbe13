use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};
use url::Url;

use crate::args::PingArgs;
use crate::error::AppResult;
use crate::http::{HttpTimer, MeasureGet, parse_target_url};
use crate::metrics::{RequestOutcome, RequestRecord, StressSummary, summarize};
use crate::schedule::IntervalScheduler;

use super::AppContext;
use super::format::{Palette, format_duration};

struct PingState {
    url: Url,
    timer: Arc<dyn MeasureGet>,
    palette: Palette,
    started_at: Instant,
    next_seq: AtomicU64,
    records: Mutex<Vec<RequestRecord>>,
}

impl PingState {
    async fn ping_once(&self) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let outcome = match self.timer.measure(&self.url).await {
            Ok(sample) => {
                println!(
                    "{} - {}",
                    self.palette.status(sample.status),
                    format_duration(sample.timings.first_byte)
                );
                RequestOutcome::Completed(sample)
            }
            Err(err) => {
                warn!(seq, "Ping failed: {}", err);
                println!("{} - {}", self.palette.failure("error"), err);
                RequestOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        let record = RequestRecord {
            seq,
            worker: 0,
            finished_after: self.started_at.elapsed(),
            outcome,
        };
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
    }
}

pub(crate) async fn run_ping(args: &PingArgs, ctx: &AppContext) -> AppResult<()> {
    let url = parse_target_url(&args.url)?;
    let timer: Arc<dyn MeasureGet> = Arc::new(HttpTimer::new(ctx.timer)?);
    let period = Duration::from_millis(args.interval_ms.get());
    run_ping_session(url, timer, period, args.duration, ctx).await
}

pub(super) async fn run_ping_session(
    url: Url,
    timer: Arc<dyn MeasureGet>,
    period: Duration,
    duration: Duration,
    ctx: &AppContext,
) -> AppResult<()> {
    println!(
        "PING {} every {} for {}",
        url,
        format_duration(period),
        format_duration(duration)
    );

    let state = Arc::new(PingState {
        url,
        timer,
        palette: ctx.palette,
        started_at: Instant::now(),
        next_seq: AtomicU64::new(0),
        records: Mutex::new(Vec::new()),
    });

    let scheduler = IntervalScheduler::new();
    let handle = {
        let state = Arc::clone(&state);
        scheduler.start(period, move || {
            let state = Arc::clone(&state);
            async move { state.ping_once().await }
        })?
    };

    let mut shutdown_rx = ctx.shutdown_tx.subscribe();
    tokio::select! {
        () = tokio::time::sleep(duration) => {}
        _ = shutdown_rx.recv() => {
            info!("Ping interrupted");
        }
    }
    scheduler.cancel(&handle).await;

    let elapsed = state.started_at.elapsed();
    let mut records =
        std::mem::take(&mut *state.records.lock().unwrap_or_else(PoisonError::into_inner));
    records.sort_by_key(|record| record.seq);
    let summary = summarize(&records, elapsed);
    for line in ping_summary_lines(&state.url, &summary) {
        println!("{}", line);
    }
    Ok(())
}

pub(super) fn ping_summary_lines(url: &Url, summary: &StressSummary) -> Vec<String> {
    let first_byte = summary.first_byte.map_or_else(
        || "first byte: no data".to_owned(),
        |stats| {
            format!(
                "first byte min/avg/max = {}/{}/{}",
                format_duration(stats.min),
                format_duration(stats.avg),
                format_duration(stats.max)
            )
        },
    );
    vec![
        String::new(),
        format!("--- {} ping statistics ---", url),
        format!(
            "{} requests, {} completed, {} failed, time {}",
            summary.total_requests,
            summary.completed_requests,
            summary.failed_requests,
            format_duration(summary.total_time)
        ),
        first_byte,
    ]
}
