use std::sync::Arc;

use chrono::Local;

use crate::args::{OutputFormat, StressArgs};
use crate::error::AppResult;
use crate::http::{HttpTimer, MeasureGet};
use crate::metrics::{RequestOutcome, RequestRecord, StressSummary};
use crate::stress::{FinishReason, StressConfig, StressReporter, run_stress};

use super::AppContext;
use super::format::{Palette, format_duration};
use super::summary::{SummaryJson, stress_summary_lines};

/// Prints per-request lines in verbose mode and the summary once at the end.
pub(super) struct ConsoleReporter {
    verbose: bool,
    output_format: OutputFormat,
    palette: Palette,
}

impl ConsoleReporter {
    pub(super) const fn new(verbose: bool, output_format: OutputFormat, palette: Palette) -> Self {
        Self {
            verbose,
            output_format,
            palette,
        }
    }

    pub(super) fn record_line(&self, record: &RequestRecord, timestamp: &str) -> String {
        match &record.outcome {
            RequestOutcome::Completed(sample) => format!(
                "[w{}|{}] {} - {}",
                record.worker,
                timestamp,
                self.palette.status(sample.status),
                format_duration(sample.timings.first_byte)
            ),
            RequestOutcome::Failed { error } => format!(
                "[w{}|{}] {} - {}",
                record.worker,
                timestamp,
                self.palette.failure("error"),
                error
            ),
        }
    }
}

impl StressReporter for ConsoleReporter {
    fn on_start(&self, config: &StressConfig) {
        if self.output_format == OutputFormat::Json {
            return;
        }
        let limit = config
            .limit
            .map_or_else(|| "no request limit".to_owned(), |limit| format!("limit {}", limit));
        println!(
            "Stressing {} with {} workers for {} ({})",
            config.url,
            config.workers,
            format_duration(config.duration),
            limit
        );
    }

    fn on_record(&self, record: &RequestRecord) {
        if !self.verbose {
            return;
        }
        let timestamp = Local::now().format("%H:%M:%S%.3f").to_string();
        let line = self.record_line(record, &timestamp);
        // stdout carries only the summary document in JSON mode.
        match self.output_format {
            OutputFormat::Text => println!("{}", line),
            OutputFormat::Json => eprintln!("{}", line),
        }
    }

    fn on_finish(&self, summary: &StressSummary, reason: FinishReason) {
        match self.output_format {
            OutputFormat::Text => {
                for line in stress_summary_lines(summary, reason, self.palette) {
                    println!("{}", line);
                }
            }
            OutputFormat::Json => match serde_json::to_string_pretty(&SummaryJson::new(summary, reason)) {
                Ok(json) => println!("{}", json),
                Err(err) => tracing::error!("Failed to serialize summary: {}", err),
            },
        }
    }
}

pub(crate) async fn run_stress_command(args: &StressArgs, ctx: &AppContext) -> AppResult<()> {
    let config = StressConfig::from_args(args)?;
    let timer: Arc<dyn MeasureGet> = Arc::new(HttpTimer::new(ctx.timer)?);
    let reporter: Arc<dyn StressReporter> = Arc::new(ConsoleReporter::new(
        config.verbose,
        ctx.output_format,
        ctx.palette,
    ));
    run_stress(&config, timer, reporter, &ctx.shutdown_tx).await?;
    Ok(())
}
