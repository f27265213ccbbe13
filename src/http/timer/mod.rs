//! Per-phase timing of a single GET request.
//!
//! Every measured request opens its own connection so DNS, TCP and TLS
//! phases are observed on each call. Redirects are not followed.
mod connect;
mod stream;
mod trace;
mod types;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, HOST, USER_AGENT};
use http::{Request, Response};
use http_body_util::Empty;
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use tokio_native_tls::TlsConnector;
use tracing::debug;
use url::Url;

use crate::args::DEFAULT_USER_AGENT;
use crate::args::defaults::{DEFAULT_CONNECT_TIMEOUT_DURATION, DEFAULT_REQUEST_TIMEOUT_DURATION};
use crate::error::HttpError;

use connect::{BoxedIo, Target, build_tls_connector, connect_tcp, handshake_tls, resolve};
use stream::FirstByteStream;

pub use trace::{PhaseRecorder, RequestTrace};
pub use types::{MeasuredResponse, PhaseTimings, RequestSample, RequestTimings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Bound on each TCP connect attempt.
    pub connect_timeout: Duration,
    /// Bound on the whole exchange up to the response head.
    pub request_timeout: Duration,
    /// Accept invalid certificates and host names.
    pub insecure: bool,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_DURATION,
            request_timeout: DEFAULT_REQUEST_TIMEOUT_DURATION,
            insecure: false,
        }
    }
}

/// Parses a command-line target, accepting only `http` and `https`.
///
/// # Errors
///
/// Returns an error when the value is not a URL or uses another scheme.
pub fn parse_target_url(value: &str) -> Result<Url, HttpError> {
    let url = Url::parse(value).map_err(|source| HttpError::InvalidUrl {
        url: value.to_owned(),
        source,
    })?;
    Target::from_url(&url)?;
    Ok(url)
}

/// Issues one measured GET and returns the status with its timings.
///
/// This is the seam the stress runner drives, so tests can substitute a
/// deterministic fake.
#[async_trait]
pub trait MeasureGet: Send + Sync {
    async fn measure(&self, url: &Url) -> Result<RequestSample, HttpError>;
}

/// Measures GET requests on fresh HTTP/1.1 connections.
#[derive(Clone)]
pub struct HttpTimer {
    config: TimerConfig,
    tls: TlsConnector,
}

impl HttpTimer {
    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn new(config: TimerConfig) -> Result<Self, HttpError> {
        let tls = build_tls_connector(config.insecure)?;
        Ok(Self { config, tls })
    }

    #[must_use]
    pub const fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Issues a GET and returns once the response head has arrived. The body
    /// is left unread on the returned response.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported URLs, resolution, connect, TLS or
    /// protocol failures, and when no response arrives within the request
    /// timeout.
    pub async fn measure_get(&self, url: &Url) -> Result<MeasuredResponse, HttpError> {
        self.measure_get_traced(url, None).await
    }

    /// Like [`HttpTimer::measure_get`], forwarding every phase hook to
    /// `observer` as it fires.
    ///
    /// # Errors
    ///
    /// See [`HttpTimer::measure_get`].
    pub async fn measure_get_traced(
        &self,
        url: &Url,
        observer: Option<Arc<dyn RequestTrace>>,
    ) -> Result<MeasuredResponse, HttpError> {
        let target = Target::from_url(url)?;
        let recorder = Arc::new(
            observer.map_or_else(PhaseRecorder::new, PhaseRecorder::with_observer),
        );
        let trace: Arc<dyn RequestTrace> = recorder.clone();

        let timeout = self.config.request_timeout;
        let Ok(result) = tokio::time::timeout(timeout, self.exchange(&target, trace)).await else {
            return Err(HttpError::RequestTimeout { timeout });
        };
        let response = result?;
        let timings = recorder.timings();
        debug!(
            url = %url,
            status = response.status().as_u16(),
            first_byte = ?timings.first_byte,
            "measured request"
        );
        Ok(MeasuredResponse::new(url.clone(), timings, response))
    }

    async fn exchange(
        &self,
        target: &Target,
        trace: Arc<dyn RequestTrace>,
    ) -> Result<Response<Incoming>, HttpError> {
        let addrs = resolve(target, trace.as_ref()).await?;
        let tcp = connect_tcp(&addrs, self.config.connect_timeout, trace.as_ref()).await?;
        let io: BoxedIo = if target.tls {
            Box::new(handshake_tls(&self.tls, tcp, target, trace.as_ref()).await?)
        } else {
            Box::new(tcp)
        };

        let stream = FirstByteStream::new(io, trace);
        let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|source| HttpError::Handshake { source })?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!("Connection closed with error: {}", err);
            }
        });

        let request = Request::get(target.path_and_query.as_str())
            .header(HOST, target.authority.as_str())
            .header(USER_AGENT, DEFAULT_USER_AGENT)
            .header(ACCEPT, "*/*")
            .body(Empty::<Bytes>::new())
            .map_err(|source| HttpError::BuildRequestFailed { source })?;

        sender
            .send_request(request)
            .await
            .map_err(|source| HttpError::RequestFailed { source })
    }
}

#[async_trait]
impl MeasureGet for HttpTimer {
    async fn measure(&self, url: &Url) -> Result<RequestSample, HttpError> {
        let measured = self.measure_get(url).await?;
        Ok(measured.sample())
    }
}
