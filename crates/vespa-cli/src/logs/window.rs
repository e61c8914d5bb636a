//! Resolution of user-supplied time flags into a concrete query window.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use thiserror::Error;

/// Lookback applied when no bound is supplied.
pub(crate) const DEFAULT_LOOKBACK: Duration = Duration::from_secs(60 * 60);

/// Errors raised while resolving a time window.
#[derive(Debug, Error)]
pub(crate) enum PeriodError {
    #[error("invalid period: cannot combine --from/--to with relative value: {0}")]
    Conflicting(String),
    #[error("invalid period: could not parse {flag} value '{value}': {source}")]
    InvalidTimestamp {
        flag: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("invalid period: could not parse relative value '{value}': {source}")]
    InvalidDuration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    #[error("invalid period: relative value '{0}' is out of range")]
    OutOfRange(String),
    #[error("invalid period: start of period must not be after its end ({from} > {to})")]
    Reversed { from: String, to: String },
}

/// Raw time flags as supplied on the command line.
#[derive(Debug, Clone, Default)]
pub(crate) struct PeriodFlags<'a> {
    pub(crate) from: Option<&'a str>,
    pub(crate) to: Option<&'a str>,
    pub(crate) relative: Option<&'a str>,
}

/// Closed time range used as the log query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TimeWindow {
    pub(crate) from: DateTime<Utc>,
    pub(crate) to: DateTime<Utc>,
}

impl TimeWindow {
    /// Query parameters for the log endpoint, in second-precision UTC.
    pub(crate) fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("from", self.from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("to", self.to.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]
    }
}

/// Resolve time flags against `now`.
///
/// A relative value is mutually exclusive with `--from`/`--to`. Missing bounds
/// fall back to `now` for the end and `end - lookback` for the start.
pub(crate) fn resolve_window(
    flags: &PeriodFlags<'_>,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<TimeWindow, PeriodError> {
    let relative = flags
        .relative
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let from = non_empty(flags.from);
    let to = non_empty(flags.to);

    if let Some(token) = relative {
        if from.is_some() || to.is_some() {
            return Err(PeriodError::Conflicting(token.to_string()));
        }
        let span = parse_relative(token)?;
        let start = now
            .checked_sub_signed(span)
            .ok_or_else(|| PeriodError::OutOfRange(token.to_string()))?;
        return Ok(TimeWindow {
            from: start,
            to: now,
        });
    }

    let end = to
        .map(|value| parse_timestamp("--to", value))
        .transpose()?
        .unwrap_or(now);
    let start = match from {
        Some(value) => parse_timestamp("--from", value)?,
        None => end - TimeDelta::from_std(lookback).unwrap_or(TimeDelta::hours(1)),
    };

    if start > end {
        return Err(PeriodError::Reversed {
            from: start.to_rfc3339_opts(SecondsFormat::Secs, true),
            to: end.to_rfc3339_opts(SecondsFormat::Secs, true),
        });
    }

    Ok(TimeWindow {
        from: start,
        to: end,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_timestamp(flag: &'static str, value: &str) -> Result<DateTime<Utc>, PeriodError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| PeriodError::InvalidTimestamp {
            flag,
            value: value.to_string(),
            source,
        })
}

fn parse_relative(token: &str) -> Result<TimeDelta, PeriodError> {
    // "-1h" and "1h" both mean one hour back
    let unsigned = token.strip_prefix('-').unwrap_or(token);
    let duration =
        humantime::parse_duration(unsigned).map_err(|source| PeriodError::InvalidDuration {
            value: token.to_string(),
            source,
        })?;
    TimeDelta::from_std(duration).map_err(|_| PeriodError::OutOfRange(token.to_string()))
}
