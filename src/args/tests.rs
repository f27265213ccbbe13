use super::*;
use crate::args::parsers::{parse_bool_env, parse_duration_arg};
use crate::error::{AppError, AppResult};
use clap::Parser;
use std::time::Duration;

fn parse(args: &[&str]) -> AppResult<HtpArgs> {
    HtpArgs::try_parse_from(args.iter().copied()).map_err(AppError::from)
}

#[test]
fn parse_args_stress_defaults() -> AppResult<()> {
    let args = parse(&["htp", "stress", "http://localhost"])?;
    let Command::Stress(stress) = &args.command else {
        return Err(AppError::validation("Expected stress command"));
    };
    if stress.url != "http://localhost" {
        return Err(AppError::validation("Unexpected url"));
    }
    if stress.limit.is_some() {
        return Err(AppError::validation("Expected no limit by default"));
    }
    if stress.duration != Duration::from_secs(10) {
        return Err(AppError::validation("Expected 10s default duration"));
    }
    if stress.workers.get() != 5 {
        return Err(AppError::validation("Expected 5 workers by default"));
    }
    if stress.verbose || args.command.verbose() {
        return Err(AppError::validation("Expected verbose to be off"));
    }
    Ok(())
}

#[test]
fn parse_args_stress_flags() -> AppResult<()> {
    let args = parse(&[
        "htp",
        "stress",
        "http://localhost:8080/health",
        "-l",
        "100",
        "-d",
        "3s",
        "-w",
        "12",
        "-v",
    ])?;
    let Command::Stress(stress) = &args.command else {
        return Err(AppError::validation("Expected stress command"));
    };
    if stress.limit.map(PositiveU64::get) != Some(100) {
        return Err(AppError::validation("Unexpected limit"));
    }
    if stress.duration != Duration::from_secs(3) {
        return Err(AppError::validation("Unexpected duration"));
    }
    if stress.workers.get() != 12 {
        return Err(AppError::validation("Unexpected workers"));
    }
    if !args.command.verbose() {
        return Err(AppError::validation("Expected verbose"));
    }
    Ok(())
}

#[test]
fn parse_args_rejects_zero_workers_and_limit() -> AppResult<()> {
    if parse(&["htp", "stress", "http://localhost", "-w", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero workers to be rejected"));
    }
    if parse(&["htp", "stress", "http://localhost", "-l", "0"]).is_ok() {
        return Err(AppError::validation("Expected zero limit to be rejected"));
    }
    Ok(())
}

#[test]
fn parse_args_ping_defaults_and_interval() -> AppResult<()> {
    let args = parse(&["htp", "ping", "http://localhost"])?;
    let Command::Ping(ping) = &args.command else {
        return Err(AppError::validation("Expected ping command"));
    };
    if ping.duration != Duration::from_secs(10) || ping.interval_ms.get() != 200 {
        return Err(AppError::validation("Unexpected ping defaults"));
    }

    let args = parse(&["htp", "ping", "http://localhost", "-d", "500ms", "-i", "50"])?;
    let Command::Ping(ping) = &args.command else {
        return Err(AppError::validation("Expected ping command"));
    };
    if ping.duration != Duration::from_millis(500) || ping.interval_ms.get() != 50 {
        return Err(AppError::validation("Unexpected ping flags"));
    }
    Ok(())
}

#[test]
fn parse_args_post_takes_url_and_body() -> AppResult<()> {
    let args = parse(&["htp", "post", "http://localhost/items", r#"{"name":"a"}"#])?;
    let Command::Post(post) = &args.command else {
        return Err(AppError::validation("Expected post command"));
    };
    if post.url != "http://localhost/items" || post.data != r#"{"name":"a"}"# {
        return Err(AppError::validation("Unexpected post args"));
    }
    Ok(())
}

#[test]
fn parse_args_requires_url() -> AppResult<()> {
    for command in ["get", "head", "time", "ping", "stress"] {
        if parse(&["htp", command]).is_ok() {
            return Err(AppError::validation(format!(
                "Expected {} without a URL to fail",
                command
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_args_global_flags_after_subcommand() -> AppResult<()> {
    let args = parse(&[
        "htp",
        "time",
        "https://localhost",
        "--timeout",
        "2s",
        "--connect-timeout",
        "250ms",
        "--insecure",
        "--output-format",
        "json",
        "--no-color",
    ])?;
    if args.request_timeout != Duration::from_secs(2) {
        return Err(AppError::validation("Unexpected request timeout"));
    }
    if args.connect_timeout != Duration::from_millis(250) {
        return Err(AppError::validation("Unexpected connect timeout"));
    }
    if !args.insecure || !args.no_color {
        return Err(AppError::validation("Expected insecure and no-color"));
    }
    if args.output_format != OutputFormat::Json {
        return Err(AppError::validation("Expected json output"));
    }
    Ok(())
}

#[test]
fn parse_args_no_color_before_subcommand() -> AppResult<()> {
    let args = parse(&["htp", "--no-color", "stress", "http://localhost", "-l", "3"])?;
    if !args.no_color {
        return Err(AppError::validation("Expected no-color"));
    }
    let Command::Stress(stress) = &args.command else {
        return Err(AppError::validation("Expected stress command"));
    };
    if stress.url != "http://localhost" || stress.limit.map(PositiveU64::get) != Some(3) {
        return Err(AppError::validation("Subcommand args were not parsed"));
    }
    Ok(())
}

#[test]
fn parse_duration_arg_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("7", Duration::from_secs(7)),
        ("7s", Duration::from_secs(7)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "Unexpected duration for {}",
                input
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_arg_rejects_bad_values() -> AppResult<()> {
    for input in ["", "0", "0ms", "abc", "10x", "ms"] {
        if parse_duration_arg(input).is_ok() {
            return Err(AppError::validation(format!(
                "Expected '{}' to be rejected",
                input
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_bool_env_values() -> AppResult<()> {
    if !parse_bool_env("Yes")? || parse_bool_env("off")? {
        return Err(AppError::validation("Unexpected boolean parse"));
    }
    if parse_bool_env("maybe").is_ok() {
        return Err(AppError::validation("Expected invalid boolean"));
    }
    Ok(())
}
