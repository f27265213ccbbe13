//! Core library for the `htp` CLI.
//!
//! `htp` times HTTP requests phase by phase (DNS, TCP connect, TLS, first
//! byte), pings endpoints on a fixed interval and stress tests them with a
//! pool of concurrent workers. The binary is a thin wrapper around
//! [`entry::run`]; the timer, scheduler, stress runner and aggregator are
//! usable on their own.
pub mod args;
pub mod entry;
pub mod error;
pub mod http;
pub mod metrics;
pub mod schedule;
pub mod shutdown;
pub mod stress;

mod app;
mod system;
