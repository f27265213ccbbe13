use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_native_tls::{TlsAcceptor, native_tls};
use url::Url;

pub(crate) const OK_RESPONSE: &[u8] =
    b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK";

/// Self-signed certificate for `localhost` and `127.0.0.1`.
const TLS_CERT_PEM: &[u8] = include_bytes!("testdata/localhost.crt");
const TLS_KEY_PEM: &[u8] = include_bytes!("testdata/localhost.key");

pub(crate) fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Local HTTP/1.1 server that answers every request with a fixed response.
pub(crate) struct TestServer {
    scheme: &'static str,
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub(crate) fn url(&self, path: &str) -> Result<Url, String> {
        Url::parse(&format!("{}://{}{}", self.scheme, self.addr, path))
            .map_err(|err| format!("Failed to build test URL: {}", err))
    }

    pub(crate) const fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub(crate) fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serves `response` to every connection. `None` accepts and reads the
/// request but never answers.
pub(crate) async fn spawn_test_server(response: Option<&'static [u8]>) -> Result<TestServer, String> {
    spawn_server(response, None).await
}

/// Like [`spawn_test_server`], behind TLS with the self-signed `localhost`
/// certificate.
pub(crate) async fn spawn_tls_test_server(response: &'static [u8]) -> Result<TestServer, String> {
    let identity = native_tls::Identity::from_pkcs8(TLS_CERT_PEM, TLS_KEY_PEM)
        .map_err(|err| format!("Failed to load test identity: {}", err))?;
    let acceptor = native_tls::TlsAcceptor::new(identity)
        .map_err(|err| format!("Failed to build TLS acceptor: {}", err))?;
    spawn_server(Some(response), Some(TlsAcceptor::from(acceptor))).await
}

async fn spawn_server(
    response: Option<&'static [u8]>,
    tls: Option<TlsAcceptor>,
) -> Result<TestServer, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("Failed to bind test server: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("Failed to read test server addr: {}", err))?;
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_task = Arc::clone(&hits);
    let scheme = if tls.is_some() { "https" } else { "http" };
    let tls = tls.map(Arc::new);

    let task = tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let hits = Arc::clone(&hits_task);
            let tls = tls.clone();
            tokio::spawn(async move {
                match tls {
                    Some(acceptor) => {
                        // Handshake failures are the client's to report.
                        if let Ok(stream) = acceptor.accept(stream).await {
                            serve_connection(stream, response, &hits).await;
                        }
                    }
                    None => serve_connection(stream, response, &hits).await,
                }
            });
        }
    });

    Ok(TestServer {
        scheme,
        addr,
        hits,
        task,
    })
}

async fn serve_connection<S>(mut stream: S, response: Option<&'static [u8]>, hits: &AtomicUsize)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(read) => request.extend_from_slice(buf.get(..read).unwrap_or_default()),
        }
    }
    hits.fetch_add(1, Ordering::SeqCst);

    match response {
        Some(response) => {
            if stream.write_all(response).await.is_ok() {
                drop(stream.shutdown().await);
            }
        }
        None => std::future::pending::<()>().await,
    }
}
