use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("htp/", env!("CARGO_PKG_VERSION"));

/// Stress and ping sessions run this long unless `-d` says otherwise.
pub(crate) const DEFAULT_SESSION_DURATION: &str = "10s";
/// Milliseconds between ping ticks.
pub(crate) const DEFAULT_PING_INTERVAL_MS: &str = "200";
pub(crate) const DEFAULT_STRESS_WORKERS: &str = "5";
pub(crate) const DEFAULT_REQUEST_TIMEOUT: &str = "30s";
pub(crate) const DEFAULT_CONNECT_TIMEOUT: &str = "10s";

pub(crate) const DEFAULT_REQUEST_TIMEOUT_DURATION: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_CONNECT_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
