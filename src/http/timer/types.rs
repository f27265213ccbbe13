use std::time::Duration;

use http::{HeaderMap, Response, StatusCode, Version};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use tokio::time::Instant;
use url::Url;

use crate::error::HttpError;

/// Phase-local durations of connection setup.
///
/// `None` marks a phase whose hooks never fired: an IP-literal host skips
/// DNS and a plain `http` URL skips TLS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    pub dns: Option<Duration>,
    pub connect: Option<Duration>,
    pub tls: Option<Duration>,
}

impl PhaseTimings {
    /// Sum of every phase that actually ran.
    #[must_use]
    pub fn total(&self) -> Duration {
        [self.dns, self.connect, self.tls]
            .into_iter()
            .flatten()
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Timings captured for one measured request.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimings {
    pub started_at: Instant,
    pub phases: PhaseTimings,
    /// Elapsed from `started_at` to the first response byte.
    pub first_byte: Duration,
}

impl RequestTimings {
    #[must_use]
    pub fn dns(&self) -> Duration {
        self.phases.dns.unwrap_or_default()
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        self.phases.connect.unwrap_or_default()
    }

    #[must_use]
    pub fn tls(&self) -> Duration {
        self.phases.tls.unwrap_or_default()
    }

    #[must_use]
    pub fn connection_setup(&self) -> Duration {
        self.phases.total()
    }

    /// Time the server spent between an established connection and the first
    /// response byte. Skipped phases contribute nothing, so this never
    /// underflows.
    #[must_use]
    pub fn server_processing(&self) -> Duration {
        self.first_byte.saturating_sub(self.connection_setup())
    }
}

/// Status and timings of a measured request, without the body.
#[derive(Debug, Clone, Copy)]
pub struct RequestSample {
    pub status: StatusCode,
    pub timings: RequestTimings,
}

/// A measured GET whose body has not been read yet.
///
/// Dropping it closes the connection.
#[derive(Debug)]
pub struct MeasuredResponse {
    url: Url,
    timings: RequestTimings,
    response: Response<Incoming>,
}

impl MeasuredResponse {
    pub(super) const fn new(url: Url, timings: RequestTimings, response: Response<Incoming>) -> Self {
        Self {
            url,
            timings,
            response,
        }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub const fn timings(&self) -> &RequestTimings {
        &self.timings
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.response.version()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    #[must_use]
    pub fn sample(&self) -> RequestSample {
        RequestSample {
            status: self.status(),
            timings: self.timings,
        }
    }

    #[must_use]
    pub fn into_response(self) -> Response<Incoming> {
        self.response
    }

    /// Reads the remaining body and returns its size in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection fails while the body is streamed.
    pub async fn drain_body(self) -> Result<u64, HttpError> {
        let mut body = self.response.into_body();
        let mut total_bytes: u64 = 0;
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(|source| HttpError::ReadBody { source })?;
            if let Some(data) = frame.data_ref() {
                total_bytes =
                    total_bytes.saturating_add(u64::try_from(data.len()).unwrap_or(u64::MAX));
            }
        }
        Ok(total_bytes)
    }
}
