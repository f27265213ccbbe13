use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, lookup_host};
use tokio_native_tls::{TlsConnector, TlsStream, native_tls};
use url::{Host, Url};

use super::trace::RequestTrace;
use crate::error::HttpError;

pub(super) trait Io: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Io for T {}

pub(super) type BoxedIo = Box<dyn Io>;

/// Connection coordinates derived from a request URL.
#[derive(Debug, Clone)]
pub(super) struct Target {
    pub(super) host: String,
    pub(super) ip: Option<IpAddr>,
    pub(super) port: u16,
    pub(super) tls: bool,
    /// Value of the `Host` header.
    pub(super) authority: String,
    pub(super) path_and_query: String,
}

impl Target {
    pub(super) fn from_url(url: &Url) -> Result<Self, HttpError> {
        let tls = match url.scheme() {
            "http" => false,
            "https" => true,
            other => {
                return Err(HttpError::UnsupportedScheme {
                    scheme: other.to_owned(),
                });
            }
        };
        let (host, ip) = match url.host() {
            Some(Host::Domain(domain)) => (domain.to_owned(), None),
            Some(Host::Ipv4(addr)) => (addr.to_string(), Some(IpAddr::V4(addr))),
            Some(Host::Ipv6(addr)) => (addr.to_string(), Some(IpAddr::V6(addr))),
            None => {
                return Err(HttpError::MissingHost {
                    url: url.to_string(),
                });
            }
        };
        let port = url
            .port_or_known_default()
            .unwrap_or(if tls { 443 } else { 80 });
        let host_header = url.host_str().unwrap_or(host.as_str());
        let authority = url.port().map_or_else(
            || host_header.to_owned(),
            |explicit| format!("{host_header}:{explicit}"),
        );
        let mut path_and_query = match url.path() {
            "" => "/".to_owned(),
            path => path.to_owned(),
        };
        if let Some(query) = url.query() {
            path_and_query.push('?');
            path_and_query.push_str(query);
        }

        Ok(Self {
            host,
            ip,
            port,
            tls,
            authority,
            path_and_query,
        })
    }
}

/// Resolves the target. IP literals bypass DNS and fire no DNS hooks.
pub(super) async fn resolve(
    target: &Target,
    trace: &dyn RequestTrace,
) -> Result<Vec<SocketAddr>, HttpError> {
    if let Some(ip) = target.ip {
        return Ok(vec![SocketAddr::new(ip, target.port)]);
    }

    trace.dns_start(&target.host);
    let addrs: Vec<SocketAddr> = match lookup_host((target.host.as_str(), target.port)).await {
        Ok(addrs) => addrs.collect(),
        Err(source) => {
            trace.dns_done(&[]);
            return Err(HttpError::ResolveHost {
                host: target.host.clone(),
                port: target.port,
                source,
            });
        }
    };
    trace.dns_done(&addrs);

    if addrs.is_empty() {
        return Err(HttpError::NoAddressesResolved {
            host: target.host.clone(),
        });
    }
    Ok(addrs)
}

/// Tries each address in order and returns the first established stream.
pub(super) async fn connect_tcp(
    addrs: &[SocketAddr],
    connect_timeout: Duration,
    trace: &dyn RequestTrace,
) -> Result<TcpStream, HttpError> {
    let mut last_error = None;
    for addr in addrs.iter().copied() {
        trace.connect_start(addr);
        match tokio::time::timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                trace.connect_done(addr, None);
                if let Err(err) = stream.set_nodelay(true) {
                    tracing::debug!("Failed to set TCP_NODELAY on {}: {}", addr, err);
                }
                return Ok(stream);
            }
            Ok(Err(source)) => {
                trace.connect_done(addr, Some(&source));
                last_error = Some(HttpError::Connect { addr, source });
            }
            Err(elapsed) => {
                let source = std::io::Error::new(std::io::ErrorKind::TimedOut, elapsed);
                trace.connect_done(addr, Some(&source));
                last_error = Some(HttpError::ConnectTimeout {
                    addr,
                    timeout: connect_timeout,
                });
            }
        }
    }
    Err(last_error.unwrap_or_else(|| HttpError::NoAddressesResolved {
        host: String::new(),
    }))
}

pub(super) fn build_tls_connector(insecure: bool) -> Result<TlsConnector, HttpError> {
    let connector = native_tls::TlsConnector::builder()
        .danger_accept_invalid_certs(insecure)
        .danger_accept_invalid_hostnames(insecure)
        .build()
        .map_err(|source| HttpError::TlsConfig { source })?;
    Ok(TlsConnector::from(connector))
}

pub(super) async fn handshake_tls(
    connector: &TlsConnector,
    stream: TcpStream,
    target: &Target,
    trace: &dyn RequestTrace,
) -> Result<TlsStream<TcpStream>, HttpError> {
    trace.tls_handshake_start();
    match connector.connect(&target.host, stream).await {
        Ok(tls) => {
            trace.tls_handshake_done(None);
            Ok(tls)
        }
        Err(source) => {
            trace.tls_handshake_done(Some(&source));
            Err(HttpError::TlsHandshake {
                host: target.host.clone(),
                source,
            })
        }
    }
}
