use std::time::Duration;

use serde::Serialize;

use crate::args::{OutputFormat, UrlArgs};
use crate::error::AppResult;
use crate::http::{HttpTimer, RequestTimings, parse_target_url};

use super::AppContext;
use super::format::{Palette, duration_micros, format_duration};

/// Phase breakdown of one measured GET. Durations are in microseconds;
/// `None` marks a phase the request never went through.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub(super) struct TimeReport {
    pub(super) url: String,
    pub(super) status: u16,
    pub(super) reason: Option<&'static str>,
    pub(super) dns_lookup_us: Option<u64>,
    pub(super) tcp_connection_us: Option<u64>,
    pub(super) tls_handshake_us: Option<u64>,
    pub(super) connect_us: u64,
    pub(super) first_byte_us: u64,
    pub(super) server_processing_us: u64,
    pub(super) content_transfer_us: u64,
    pub(super) total_us: u64,
    pub(super) body_bytes: u64,
}

impl TimeReport {
    pub(super) fn new(
        url: &url::Url,
        status: http::StatusCode,
        timings: &RequestTimings,
        total: Duration,
        body_bytes: u64,
    ) -> Self {
        Self {
            url: url.to_string(),
            status: status.as_u16(),
            reason: status.canonical_reason(),
            dns_lookup_us: timings.phases.dns.map(duration_micros),
            tcp_connection_us: timings.phases.connect.map(duration_micros),
            tls_handshake_us: timings.phases.tls.map(duration_micros),
            connect_us: duration_micros(timings.connection_setup()),
            first_byte_us: duration_micros(timings.first_byte),
            server_processing_us: duration_micros(timings.server_processing()),
            content_transfer_us: duration_micros(total.saturating_sub(timings.first_byte)),
            total_us: duration_micros(total),
            body_bytes,
        }
    }
}

pub(crate) async fn run_time(args: &UrlArgs, ctx: &AppContext) -> AppResult<()> {
    let url = parse_target_url(&args.url)?;
    let timer = HttpTimer::new(ctx.timer)?;
    let measured = timer.measure_get(&url).await?;
    let status = measured.status();
    let timings = *measured.timings();
    let body_bytes = measured.drain_body().await?;
    let total = timings.started_at.elapsed();

    let report = TimeReport::new(&url, status, &timings, total, body_bytes);
    match ctx.output_format {
        OutputFormat::Text => {
            for line in time_report_lines(&report, ctx.palette) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

pub(super) fn time_report_lines(report: &TimeReport, palette: Palette) -> Vec<String> {
    let phase = |value: Option<u64>| {
        value.map_or_else(
            || "skipped".to_owned(),
            |micros| format_duration(Duration::from_micros(micros)),
        )
    };
    let fixed = |micros: u64| format_duration(Duration::from_micros(micros));
    let status = report.reason.map_or_else(
        || report.status.to_string(),
        |reason| {
            format!(
                "{} {}",
                palette.status(http::StatusCode::from_u16(report.status).unwrap_or_default()),
                reason
            )
        },
    );

    let rows = [
        ("URL:", report.url.clone()),
        ("Status:", status),
        ("DNS Lookup:", phase(report.dns_lookup_us)),
        ("TCP Connection:", phase(report.tcp_connection_us)),
        ("TLS Handshake:", phase(report.tls_handshake_us)),
        ("Connect:", fixed(report.connect_us)),
        ("First Byte:", fixed(report.first_byte_us)),
        ("Server Processing:", fixed(report.server_processing_us)),
        ("Content Transfer:", fixed(report.content_transfer_us)),
        ("Total:", fixed(report.total_us)),
    ];

    rows.into_iter()
        .map(|(label, value)| format!("{}{}", palette.label(&format!("{:<19}", label)), value))
        .collect()
}
