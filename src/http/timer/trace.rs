use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tokio_native_tls::native_tls;
use tracing::trace;

use super::types::{PhaseTimings, RequestTimings};

/// Hooks fired at the phase boundaries of a measured request.
///
/// They run inline on the I/O path, so implementations should stay cheap.
/// A host given as an IP literal never fires the DNS hooks, and plain `http`
/// never fires the TLS hooks. Every `*_start` is paired with its `*_done`,
/// failures included (a failed lookup reports no addresses).
/// `connect_start`/`connect_done` fire once per attempted address.
pub trait RequestTrace: Send + Sync {
    fn dns_start(&self, _host: &str) {}
    fn dns_done(&self, _addrs: &[SocketAddr]) {}
    fn connect_start(&self, _addr: SocketAddr) {}
    fn connect_done(&self, _addr: SocketAddr, _error: Option<&std::io::Error>) {}
    fn tls_handshake_start(&self) {}
    fn tls_handshake_done(&self, _error: Option<&native_tls::Error>) {}
    fn first_response_byte(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
struct PhaseMarks {
    dns_start: Option<Instant>,
    dns_done: Option<Instant>,
    connect_start: Option<Instant>,
    connect_done: Option<Instant>,
    tls_start: Option<Instant>,
    tls_done: Option<Instant>,
    first_byte: Option<Instant>,
}

/// Records phase-boundary instants and turns them into [`RequestTimings`].
///
/// Every hook is forwarded to the optional observer after it is recorded.
pub struct PhaseRecorder {
    started_at: Instant,
    marks: Mutex<PhaseMarks>,
    observer: Option<Arc<dyn RequestTrace>>,
}

impl PhaseRecorder {
    /// Starts the request clock now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            marks: Mutex::new(PhaseMarks::default()),
            observer: None,
        }
    }

    #[must_use]
    pub fn with_observer(observer: Arc<dyn RequestTrace>) -> Self {
        Self {
            observer: Some(observer),
            ..Self::new()
        }
    }

    #[must_use]
    pub const fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Snapshot of the phases seen so far. Falls back to the current elapsed
    /// time when no response byte has arrived yet.
    #[must_use]
    pub fn timings(&self) -> RequestTimings {
        let marks = *self.marks.lock().unwrap_or_else(PoisonError::into_inner);
        let first_byte = marks.first_byte.map_or_else(
            || self.started_at.elapsed(),
            |at| at.saturating_duration_since(self.started_at),
        );
        RequestTimings {
            started_at: self.started_at,
            phases: PhaseTimings {
                dns: span(marks.dns_start, marks.dns_done),
                connect: span(marks.connect_start, marks.connect_done),
                tls: span(marks.tls_start, marks.tls_done),
            },
            first_byte,
        }
    }

    fn mark(&self, update: impl FnOnce(&mut PhaseMarks, Instant)) {
        let now = Instant::now();
        let mut marks = self.marks.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut marks, now);
    }

    fn elapsed_since(&self, start: impl FnOnce(&PhaseMarks) -> Option<Instant>) -> Duration {
        let marks = self.marks.lock().unwrap_or_else(PoisonError::into_inner);
        start(&marks).map_or(Duration::ZERO, |at| at.elapsed())
    }
}

impl Default for PhaseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

fn span(start: Option<Instant>, done: Option<Instant>) -> Option<Duration> {
    start
        .zip(done)
        .map(|(start, done)| done.saturating_duration_since(start))
}

impl RequestTrace for PhaseRecorder {
    fn dns_start(&self, host: &str) {
        self.mark(|marks, now| marks.dns_start = Some(now));
        trace!(host, "dns lookup started");
        if let Some(observer) = &self.observer {
            observer.dns_start(host);
        }
    }

    fn dns_done(&self, addrs: &[SocketAddr]) {
        let elapsed = self.elapsed_since(|marks| marks.dns_start);
        self.mark(|marks, now| marks.dns_done = Some(now));
        trace!(addrs = addrs.len(), ?elapsed, "dns lookup done");
        if let Some(observer) = &self.observer {
            observer.dns_done(addrs);
        }
    }

    fn connect_start(&self, addr: SocketAddr) {
        self.mark(|marks, now| {
            marks.connect_start = Some(now);
            marks.connect_done = None;
        });
        trace!(%addr, "tcp connect started");
        if let Some(observer) = &self.observer {
            observer.connect_start(addr);
        }
    }

    fn connect_done(&self, addr: SocketAddr, error: Option<&std::io::Error>) {
        let elapsed = self.elapsed_since(|marks| marks.connect_start);
        self.mark(|marks, now| marks.connect_done = Some(now));
        trace!(%addr, ?elapsed, failed = error.is_some(), "tcp connect done");
        if let Some(observer) = &self.observer {
            observer.connect_done(addr, error);
        }
    }

    fn tls_handshake_start(&self) {
        self.mark(|marks, now| marks.tls_start = Some(now));
        trace!("tls handshake started");
        if let Some(observer) = &self.observer {
            observer.tls_handshake_start();
        }
    }

    fn tls_handshake_done(&self, error: Option<&native_tls::Error>) {
        let elapsed = self.elapsed_since(|marks| marks.tls_start);
        self.mark(|marks, now| marks.tls_done = Some(now));
        trace!(?elapsed, failed = error.is_some(), "tls handshake done");
        if let Some(observer) = &self.observer {
            observer.tls_handshake_done(error);
        }
    }

    fn first_response_byte(&self) {
        let mut first = false;
        self.mark(|marks, now| {
            if marks.first_byte.is_none() {
                marks.first_byte = Some(now);
                first = true;
            }
        });
        if !first {
            return;
        }
        trace!(elapsed = ?self.started_at.elapsed(), "first response byte");
        if let Some(observer) = &self.observer {
            observer.first_response_byte();
        }
    }
}
