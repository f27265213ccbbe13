//! Concurrent load sessions against a single endpoint.
//!
//! A session ends on whichever comes first: the request quota is used up,
//! the deadline passes, or the process is interrupted. Requests already in
//! flight at that point still complete and are recorded.
mod config;
mod runner;
mod session;
mod worker;


pub use config::StressConfig;
pub use runner::{StressReport, StressReporter, run_stress};
pub use session::{Finish, FinishReason};
