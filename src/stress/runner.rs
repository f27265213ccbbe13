use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::config::StressConfig;
use super::session::{Finish, FinishReason, StressSession};
use super::worker::{WorkerContext, run_worker};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::MeasureGet;
use crate::metrics::{RequestRecord, StressSummary, summarize};
use crate::shutdown::ShutdownSender;

/// Receives session progress. `on_finish` is called exactly once per
/// session, after every worker has stopped.
pub trait StressReporter: Send + Sync {
    fn on_start(&self, _config: &StressConfig) {}
    fn on_record(&self, _record: &RequestRecord) {}
    fn on_finish(&self, summary: &StressSummary, reason: FinishReason);
}

#[derive(Debug, Clone)]
pub struct StressReport {
    pub summary: StressSummary,
    pub reason: FinishReason,
}

/// Runs one stress session to completion.
///
/// # Errors
///
/// Returns a validation error when the configuration has no workers or a
/// zero duration.
pub async fn run_stress(
    config: &StressConfig,
    timer: Arc<dyn MeasureGet>,
    reporter: Arc<dyn StressReporter>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<StressReport> {
    if config.workers == 0 {
        return Err(AppError::validation(ValidationError::ValueTooSmall { min: 1 }));
    }
    if config.duration.is_zero() {
        return Err(AppError::validation(ValidationError::DurationZero));
    }

    let session = Arc::new(StressSession::new(config.limit));
    let mut finished_rx = session.subscribe();
    let url = Arc::new(config.url.clone());

    info!(
        url = %config.url,
        workers = config.workers,
        duration = ?config.duration,
        limit = ?config.limit,
        "Starting stress test"
    );
    reporter.on_start(config);

    let deadline_task = {
        let session = Arc::clone(&session);
        let duration = config.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            session.finish(FinishReason::Deadline);
        })
    };
    let interrupt_task = {
        let session = Arc::clone(&session);
        let mut shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            match shutdown_rx.recv().await {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    session.finish(FinishReason::Interrupted);
                }
                Err(broadcast::error::RecvError::Closed) => {}
            }
        })
    };

    let mut workers = JoinSet::new();
    for worker in 0..config.workers {
        let ctx = WorkerContext {
            session: Arc::clone(&session),
            timer: Arc::clone(&timer),
            reporter: Arc::clone(&reporter),
            url: Arc::clone(&url),
        };
        workers.spawn(run_worker(worker, ctx));
    }

    let finish = finished_rx
        .wait_for(Option::is_some)
        .await
        .ok()
        .and_then(|finished| *finished);
    deadline_task.abort();
    interrupt_task.abort();

    while let Some(result) = workers.join_next().await {
        if let Err(err) = result {
            warn!("Stress worker failed: {}", err);
        }
    }

    let finish = finish
        .or_else(|| session.finished())
        .unwrap_or_else(|| Finish {
            reason: FinishReason::Interrupted,
            elapsed: session.started_at().elapsed(),
        });
    let records = session.take_records();
    let summary = summarize(&records, finish.elapsed);
    info!(
        reason = %finish.reason,
        total = summary.total_requests,
        failed = summary.failed_requests,
        "Stress test finished"
    );
    reporter.on_finish(&summary, finish.reason);

    Ok(StressReport {
        summary,
        reason: finish.reason,
    })
}
