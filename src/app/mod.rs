//! Command handlers behind the CLI subcommands.
mod fetch;
mod format;
mod ping;
mod stress;
mod summary;
mod time;


use crate::args::{HtpArgs, OutputFormat};
use crate::http::TimerConfig;
use crate::shutdown::ShutdownSender;

pub(crate) use fetch::{run_get, run_head, run_post};
pub(crate) use ping::run_ping;
pub(crate) use stress::run_stress_command;
pub(crate) use time::run_time;

use format::Palette;

/// Settings shared by every command.
pub(crate) struct AppContext {
    pub(crate) timer: TimerConfig,
    pub(crate) output_format: OutputFormat,
    pub(crate) palette: Palette,
    pub(crate) shutdown_tx: ShutdownSender,
}

impl AppContext {
    pub(crate) fn new(args: &HtpArgs, shutdown_tx: ShutdownSender) -> Self {
        Self {
            timer: TimerConfig {
                connect_timeout: args.connect_timeout,
                request_timeout: args.request_timeout,
                insecure: args.insecure,
            },
            output_format: args.output_format,
            palette: Palette::new(args.no_color),
            shutdown_tx,
        }
    }
}
