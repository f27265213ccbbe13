use clap::{ArgAction, Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_PING_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SESSION_DURATION, DEFAULT_STRESS_WORKERS,
};
use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_positive_u64, parse_positive_usize,
};
use super::types::{OutputFormat, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "htp",
    version,
    about = "Time HTTP requests phase by phase, ping endpoints on an interval, and stress test them with concurrent workers."
)]
pub struct HtpArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Timeout for a whole request up to the response headers (supports ms/s/m/h)
    #[arg(
        long = "timeout",
        global = true,
        env = "HTP_TIMEOUT",
        default_value = DEFAULT_REQUEST_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub request_timeout: Duration,

    /// Timeout for each TCP connect attempt (supports ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        global = true,
        env = "HTP_CONNECT_TIMEOUT",
        default_value = DEFAULT_CONNECT_TIMEOUT,
        value_parser = parse_duration_arg
    )]
    pub connect_timeout: Duration,

    /// Skip TLS certificate and hostname verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Report format for `time` and `stress`
    #[arg(
        long = "output-format",
        global = true,
        default_value = "text",
        ignore_case = true
    )]
    pub output_format: OutputFormat,

    /// Disable colored output
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        action = ArgAction::SetTrue,
        value_parser = parse_bool_env
    )]
    pub no_color: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Make a GET request and print the status and body
    Get(UrlArgs),
    /// Make a POST request with a JSON body
    Post(PostArgs),
    /// Make a HEAD request and print the status and headers
    Head(UrlArgs),
    /// Make and time a GET request, phase by phase
    Time(UrlArgs),
    /// Repeatedly make timed GET requests on a fixed interval
    Ping(PingArgs),
    /// Stress test an endpoint with concurrent GET requests
    Stress(StressArgs),
}

impl Command {
    #[must_use]
    pub const fn verbose(&self) -> bool {
        match self {
            Command::Stress(stress) => stress.verbose,
            Command::Get(_)
            | Command::Post(_)
            | Command::Head(_)
            | Command::Time(_)
            | Command::Ping(_) => false,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct UrlArgs {
    /// Target URL
    pub url: String,
}

#[derive(Debug, Args, Clone)]
pub struct PostArgs {
    /// Target URL
    pub url: String,

    /// JSON request body
    pub data: String,
}

#[derive(Debug, Args, Clone)]
pub struct PingArgs {
    /// Target URL
    pub url: String,

    /// How long to keep pinging (supports ms/s/m/h; bare numbers are seconds)
    #[arg(
        long,
        short = 'd',
        default_value = DEFAULT_SESSION_DURATION,
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// Milliseconds between pings
    #[arg(
        long = "interval",
        short = 'i',
        default_value = DEFAULT_PING_INTERVAL_MS,
        value_parser = parse_positive_u64
    )]
    pub interval_ms: PositiveU64,
}

#[derive(Debug, Args, Clone)]
pub struct StressArgs {
    /// Target URL
    pub url: String,

    /// Stop after N total requests (unbounded when omitted)
    #[arg(long, short = 'l', value_parser = parse_positive_u64)]
    pub limit: Option<PositiveU64>,

    /// Duration of the test (supports ms/s/m/h; bare numbers are seconds)
    #[arg(
        long,
        short = 'd',
        default_value = DEFAULT_SESSION_DURATION,
        value_parser = parse_duration_arg
    )]
    pub duration: Duration,

    /// Number of concurrent workers
    #[arg(
        long,
        short = 'w',
        default_value = DEFAULT_STRESS_WORKERS,
        value_parser = parse_positive_usize
    )]
    pub workers: PositiveUsize,

    /// Print a line per request and enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
