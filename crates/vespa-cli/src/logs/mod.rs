//! Log retrieval primitives: wire parsing and time window resolution.

pub(crate) mod record;
pub(crate) mod window;

pub(crate) use record::{LogRecord, parse_log_records};
pub(crate) use window::{DEFAULT_LOOKBACK, PeriodFlags, TimeWindow, resolve_window};
