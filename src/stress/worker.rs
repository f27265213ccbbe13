use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use super::runner::StressReporter;
use super::session::{FinishReason, StressSession};
use crate::http::MeasureGet;
use crate::metrics::{RequestOutcome, RequestRecord};

pub(super) struct WorkerContext {
    pub(super) session: Arc<StressSession>,
    pub(super) timer: Arc<dyn MeasureGet>,
    pub(super) reporter: Arc<dyn StressReporter>,
    pub(super) url: Arc<Url>,
}

/// Issues requests until the session stops or no quota is left to claim.
/// A request already started when the stop flag flips is still recorded.
pub(super) async fn run_worker(worker: usize, ctx: WorkerContext) {
    let mut issued: u64 = 0;
    loop {
        if ctx.session.should_stop() {
            break;
        }
        let Some(seq) = ctx.session.claim() else {
            debug!(worker, "no quota left to claim");
            break;
        };

        let outcome = match ctx.timer.measure(&ctx.url).await {
            Ok(sample) => RequestOutcome::Completed(sample),
            Err(err) => {
                warn!(worker, seq, "Request failed: {}", err);
                RequestOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        issued = issued.saturating_add(1);

        let record = RequestRecord {
            seq,
            worker,
            finished_after: ctx.session.started_at().elapsed(),
            outcome,
        };
        ctx.reporter.on_record(&record);
        if ctx.session.record(record) {
            ctx.session.finish(FinishReason::QuotaExhausted);
            break;
        }
    }
    debug!(worker, issued, "stress worker exiting");
}
