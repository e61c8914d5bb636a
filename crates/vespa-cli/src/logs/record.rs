//! Parsing of the tab-separated log wire format.
//!
//! Each line carries seven fields: fractional epoch seconds, host, pid/tid,
//! service, component, level, and message. Lines that do not match are
//! dropped so that partial corruption never hides the rest of the response.

use chrono::{DateTime, Utc};

const FIELD_COUNT: usize = 7;
const MICROS_PER_SECOND: i64 = 1_000_000;

/// A single log entry as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogRecord {
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) host: String,
    pub(crate) process: String,
    pub(crate) service: String,
    pub(crate) component: String,
    pub(crate) level: String,
    pub(crate) message: String,
}

impl LogRecord {
    /// Parse one wire line, returning `None` when the line is malformed.
    pub(crate) fn parse_line(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            return None;
        }

        let mut fields = line.splitn(FIELD_COUNT, '\t');
        let timestamp = parse_epoch(fields.next()?)?;
        let host = fields.next()?;
        let process = fields.next()?;
        let service = fields.next()?;
        let component = fields.next()?;
        let level = fields.next()?;
        let message = fields.next()?;

        Some(Self {
            timestamp,
            host: host.to_string(),
            process: process.to_string(),
            service: service.to_string(),
            component: component.to_string(),
            level: level.to_string(),
            message: message.to_string(),
        })
    }
}

/// Parse a full response body into records, preserving input order.
pub(crate) fn parse_log_records(body: &str) -> Vec<LogRecord> {
    body.lines().filter_map(LogRecord::parse_line).collect()
}

/// Convert fractional epoch seconds into an instant with microsecond precision.
///
/// Plain decimal input is converted digit by digit so that no precision is
/// lost to floating point; digits beyond microseconds are truncated.
#[allow(clippy::cast_possible_truncation)]
fn parse_epoch(field: &str) -> Option<DateTime<Utc>> {
    let field = field.trim();
    let approximate = field.parse::<f64>().ok().filter(|value| value.is_finite())?;

    if let Some(micros) = exact_epoch_micros(field) {
        return DateTime::from_timestamp_micros(micros);
    }

    // exponent notation and similar forms
    let micros = (approximate * 1_000_000.0).round();
    if micros.abs() >= 9.0e18 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

fn exact_epoch_micros(field: &str) -> Option<i64> {
    let (whole, fraction) = field.split_once('.').unwrap_or((field, ""));
    let (negative, digits) = match whole.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, whole.strip_prefix('+').unwrap_or(whole)),
    };
    if digits.is_empty() && fraction.is_empty() {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let seconds = if digits.is_empty() {
        0
    } else {
        digits.parse::<i64>().ok()?
    };
    let mut micros = 0_i64;
    for position in 0..6 {
        let digit = fraction
            .as_bytes()
            .get(position)
            .map_or(0, |byte| i64::from(byte - b'0'));
        micros = micros * 10 + digit;
    }

    let total = seconds.checked_mul(MICROS_PER_SECOND)?.checked_add(micros)?;
    Some(if negative { -total } else { total })
}
