use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Transport-level failures raised while issuing a single request.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
    #[error("URL '{url}' has no host.")]
    MissingHost { url: String },
    #[error("Failed to resolve {host}:{port} ({source})")]
    ResolveHost {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("No addresses resolved for {host}.")]
    NoAddressesResolved { host: String },
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Connecting to {addr} timed out after {timeout:?}.")]
    ConnectTimeout { addr: SocketAddr, timeout: Duration },
    #[error("Failed to configure TLS: {source}")]
    TlsConfig {
        #[source]
        source: tokio_native_tls::native_tls::Error,
    },
    #[error("TLS handshake with {host} failed: {source}")]
    TlsHandshake {
        host: String,
        #[source]
        source: tokio_native_tls::native_tls::Error,
    },
    #[error("HTTP handshake failed: {source}")]
    Handshake {
        #[source]
        source: hyper::Error,
    },
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: http::Error,
    },
    #[error("Request failed: {source}")]
    RequestFailed {
        #[source]
        source: hyper::Error,
    },
    #[error("No response within {timeout:?}.")]
    RequestTimeout { timeout: Duration },
    #[error("Failed to read response body: {source}")]
    ReadBody {
        #[source]
        source: hyper::Error,
    },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
}
