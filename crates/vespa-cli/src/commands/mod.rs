//! Command handlers grouped by concern.

pub(crate) mod log;
pub(crate) mod version;

pub(crate) use log::handle_log;
pub(crate) use version::handle_version;
