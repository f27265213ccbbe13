use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::metrics::RequestRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    QuotaExhausted,
    Deadline,
    Interrupted,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FinishReason::QuotaExhausted => "request limit reached",
            FinishReason::Deadline => "duration elapsed",
            FinishReason::Interrupted => "interrupted",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finish {
    pub reason: FinishReason,
    /// Wall time from session start to the winning trigger.
    pub elapsed: Duration,
}

/// Cross-worker mutable state. Only ever touched under the session lock.
#[derive(Debug, Default)]
struct Ledger {
    remaining: Option<u64>,
    in_flight: u64,
    next_seq: u64,
    records: BTreeMap<u64, RequestRecord>,
}

/// Shared state of one stress session.
pub(super) struct StressSession {
    started_at: Instant,
    stop: AtomicBool,
    finishing: AtomicBool,
    finished_tx: watch::Sender<Option<Finish>>,
    ledger: Mutex<Ledger>,
}

impl StressSession {
    pub(super) fn new(limit: Option<u64>) -> Self {
        let (finished_tx, _) = watch::channel(None);
        Self {
            started_at: Instant::now(),
            stop: AtomicBool::new(false),
            finishing: AtomicBool::new(false),
            finished_tx,
            ledger: Mutex::new(Ledger {
                remaining: limit,
                ..Ledger::default()
            }),
        }
    }

    pub(super) const fn started_at(&self) -> Instant {
        self.started_at
    }

    pub(super) fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims a sequence number for the next request. Refused once every
    /// remaining unit of quota is held by an in-flight request.
    pub(super) fn claim(&self) -> Option<u64> {
        let mut ledger = self.ledger();
        if let Some(remaining) = ledger.remaining
            && remaining <= ledger.in_flight
        {
            return None;
        }
        let seq = ledger.next_seq;
        ledger.next_seq = ledger.next_seq.saturating_add(1);
        ledger.in_flight = ledger.in_flight.saturating_add(1);
        Some(seq)
    }

    /// Stores the record, releases its claim and debits the quota in one
    /// step. Returns `true` when this record used up the quota.
    pub(super) fn record(&self, record: RequestRecord) -> bool {
        let mut ledger = self.ledger();
        ledger.records.insert(record.seq, record);
        ledger.in_flight = ledger.in_flight.saturating_sub(1);
        ledger.remaining.as_mut().is_some_and(|remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining == 0
        })
    }

    /// Stops the workers and publishes the finish. Only the first caller
    /// wins; later calls return `false` and change nothing.
    pub(super) fn finish(&self, reason: FinishReason) -> bool {
        if self
            .finishing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        let finish = Finish {
            reason,
            elapsed: self.started_at.elapsed(),
        };
        self.stop.store(true, Ordering::Release);
        self.finished_tx.send_replace(Some(finish));
        debug!(%reason, elapsed = ?finish.elapsed, "stress session finishing");
        true
    }

    pub(super) fn subscribe(&self) -> watch::Receiver<Option<Finish>> {
        self.finished_tx.subscribe()
    }

    pub(super) fn finished(&self) -> Option<Finish> {
        *self.finished_tx.borrow()
    }

    #[cfg(test)]
    pub(super) fn recorded(&self) -> usize {
        self.ledger().records.len()
    }

    /// Drains the results in sequence order.
    pub(super) fn take_records(&self) -> Vec<RequestRecord> {
        std::mem::take(&mut self.ledger().records)
            .into_values()
            .collect()
    }
}
