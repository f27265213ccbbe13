//! Measured and one-shot HTTP requests.
mod fetch;
mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use fetch::{FetchClient, FetchedResponse, validate_json_body};
pub use timer::{
    HttpTimer, MeasureGet, MeasuredResponse, PhaseRecorder, PhaseTimings, RequestSample,
    RequestTimings, RequestTrace, TimerConfig, parse_target_url,
};

#[cfg(test)]
mod tests;
