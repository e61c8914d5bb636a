//! Output renderers and formatting helpers for CLI commands.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};

use crate::logs::LogRecord;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
const LEVEL_WIDTH: usize = 7;

/// Time zone used when rendering record timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum DisplayZone {
    #[default]
    Local,
    Utc,
}

/// Rendering switches for log output.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LogRenderOptions {
    pub(crate) zone: DisplayZone,
    /// Expand escaped `\n` and `\t` sequences in messages.
    pub(crate) dequote: bool,
}

/// Write one line per record, in order.
pub(crate) fn render_log_records<W: Write>(
    out: &mut W,
    records: &[LogRecord],
    options: LogRenderOptions,
) -> io::Result<()> {
    for record in records {
        writeln!(out, "{}", format_log_record(record, options))?;
    }
    out.flush()
}

#[must_use]
pub(crate) fn format_log_record(record: &LogRecord, options: LogRenderOptions) -> String {
    let message = if options.dequote {
        dequote(&record.message)
    } else {
        record.message.clone()
    };
    format!(
        "[{}] {} {:<width$} {} {}\t{}",
        format_timestamp(record.timestamp, options.zone),
        record.host,
        record.level,
        record.service,
        record.component,
        message,
        width = LEVEL_WIDTH,
    )
}

#[must_use]
pub(crate) fn format_timestamp(timestamp: DateTime<Utc>, zone: DisplayZone) -> String {
    match zone {
        DisplayZone::Local => timestamp
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        DisplayZone::Utc => timestamp.format(TIMESTAMP_FORMAT).to_string(),
    }
}

fn dequote(message: &str) -> String {
    message.replace("\\n", "\n").replace("\\t", "\t")
}
