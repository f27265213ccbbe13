//! Per-request records and their aggregation into a session summary.
mod aggregate;
mod types;

#[cfg(test)]
mod tests;

pub use aggregate::summarize;
pub use types::{FirstByteStats, RequestOutcome, RequestRecord, StressSummary};
