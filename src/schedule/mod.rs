//! Cancellable repeating background tasks.
//!
//! Each interval runs on its own driver task. Every tick spawns one
//! invocation of the callback, so a slow callback overlaps the next one.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(u64);

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "interval-{}", self.0)
    }
}

/// Owned reference to a running interval, returned by
/// [`IntervalScheduler::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalHandle {
    id: IntervalId,
    period: Duration,
}

impl IntervalHandle {
    #[must_use]
    pub const fn id(&self) -> IntervalId {
        self.id
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }
}

struct IntervalEntry {
    stop: oneshot::Sender<()>,
    driver: JoinHandle<()>,
}

/// Registry of running intervals. Dropping it stops them all.
#[derive(Default)]
pub struct IntervalScheduler {
    next_id: AtomicU64,
    intervals: RwLock<HashMap<IntervalId, IntervalEntry>>,
}

impl IntervalScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `callback` every `period`, starting one period from now.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IntervalZero`] for a zero period.
    pub fn start<F, Fut>(&self, period: Duration, callback: F) -> Result<IntervalHandle, ValidationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(ValidationError::IntervalZero);
        }

        let id = IntervalId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (stop_tx, stop_rx) = oneshot::channel();
        let driver = tokio::spawn(drive_interval(id, period, callback, stop_rx));

        self.intervals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                IntervalEntry {
                    stop: stop_tx,
                    driver,
                },
            );
        debug!(%id, ?period, "interval started");

        Ok(IntervalHandle { id, period })
    }

    /// Stops the interval and waits for its in-flight invocations to finish.
    /// No invocation starts after this returns.
    ///
    /// Returns `false` when the handle was unknown or already cancelled.
    pub async fn cancel(&self, handle: &IntervalHandle) -> bool {
        let entry = self
            .intervals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&handle.id);
        let Some(entry) = entry else {
            return false;
        };
        stop_entry(handle.id, entry).await;
        true
    }

    /// Cancels every running interval.
    pub async fn cancel_all(&self) {
        let entries: Vec<(IntervalId, IntervalEntry)> = self
            .intervals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        for (id, entry) in entries {
            stop_entry(id, entry).await;
        }
    }

    #[must_use]
    pub fn active(&self) -> usize {
        self.intervals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_active(&self, handle: &IntervalHandle) -> bool {
        self.intervals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&handle.id)
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        let intervals = self
            .intervals
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (_, entry) in intervals.drain() {
            entry.driver.abort();
        }
    }
}

async fn stop_entry(id: IntervalId, entry: IntervalEntry) {
    // The driver may already be gone if the runtime is shutting down.
    drop(entry.stop.send(()));
    if let Err(err) = entry.driver.await {
        debug!(%id, "interval driver ended abnormally: {}", err);
    }
    debug!(%id, "interval cancelled");
}

async fn drive_interval<F, Fut>(
    id: IntervalId,
    period: Duration,
    callback: F,
    mut stop: oneshot::Receiver<()>,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let now = Instant::now();
    let first_tick = now.checked_add(period).unwrap_or(now);
    let mut ticker = tokio::time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut invocations = JoinSet::new();

    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            _ = ticker.tick() => {
                invocations.spawn(callback());
            }
            Some(result) = invocations.join_next(), if !invocations.is_empty() => {
                if let Err(err) = result {
                    debug!(%id, "interval invocation failed: {}", err);
                }
            }
        }
    }

    while let Some(result) = invocations.join_next().await {
        if let Err(err) = result {
            debug!(%id, "interval invocation failed: {}", err);
        }
    }
}
