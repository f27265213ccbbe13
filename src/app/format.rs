use std::io::IsTerminal;
use std::time::Duration;

use crossterm::style::{Attribute, Color, Stylize, style};
use reqwest::StatusCode;

/// Colors terminal output unless disabled or stdout is not a terminal.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Palette {
    enabled: bool,
}

impl Palette {
    pub(crate) fn new(no_color: bool) -> Self {
        Self {
            enabled: !no_color && std::io::stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn plain() -> Self {
        Self { enabled: false }
    }

    /// Green for 2xx, orange for 3xx, red otherwise.
    pub(crate) fn status(self, status: StatusCode) -> String {
        let text = status.as_u16().to_string();
        if !self.enabled {
            return text;
        }
        let color = match status.as_u16() {
            200..=299 => Color::Green,
            300..=399 => Color::DarkYellow,
            _ => Color::Red,
        };
        style(text).with(color).to_string()
    }

    pub(crate) fn failure(self, text: &str) -> String {
        if !self.enabled {
            return text.to_owned();
        }
        style(text).with(Color::Red).to_string()
    }

    pub(crate) fn label(self, text: &str) -> String {
        if !self.enabled {
            return text.to_owned();
        }
        style(text).attribute(Attribute::Bold).to_string()
    }
}

/// Renders `Duration` as `850µs`, `12.345ms` or `1.250s`.
pub(crate) fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1_000 {
        return format!("{}µs", micros);
    }
    if micros < 1_000_000 {
        let whole = micros.checked_div(1_000).unwrap_or(0);
        let frac = micros.checked_rem(1_000).unwrap_or(0);
        return format!("{}.{:03}ms", whole, frac);
    }
    let whole = micros.checked_div(1_000_000).unwrap_or(0);
    let frac = micros
        .checked_rem(1_000_000)
        .and_then(|rest| rest.checked_div(1_000))
        .unwrap_or(0);
    format!("{}.{:03}s", whole, frac)
}

/// Renders an x100 fixed-point value as `12.34`.
pub(crate) fn format_x100(value: u64) -> String {
    let whole = value.checked_div(100).unwrap_or(0);
    let frac = value.checked_rem(100).unwrap_or(0);
    format!("{}.{:02}", whole, frac)
}

pub(crate) fn duration_micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
