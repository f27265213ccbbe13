use std::time::Duration;

use url::Url;

use crate::args::StressArgs;
use crate::error::AppResult;
use crate::http::parse_target_url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressConfig {
    pub url: Url,
    /// Total requests to issue; unbounded when `None`.
    pub limit: Option<u64>,
    pub duration: Duration,
    pub workers: usize,
    pub verbose: bool,
}

impl StressConfig {
    /// # Errors
    ///
    /// Returns an error when the URL is not a valid `http`/`https` target.
    pub fn from_args(args: &StressArgs) -> AppResult<Self> {
        Ok(Self {
            url: parse_target_url(&args.url)?,
            limit: args.limit.map(u64::from),
            duration: args.duration,
            workers: args.workers.get(),
            verbose: args.verbose,
        })
    }
}
