#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::redundant_pub_crate)]

//! Command-line client for reading logs from a Vespa deployment.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers (`log`, `version`)
//! - `client.rs`: shared HTTP client, error type, and build version
//! - `target.rs`: local and cloud target endpoints
//! - `logs/`: log record parsing and time window resolution
//! - `output.rs`: log record rendering
//! - `version.rs`, `probe.rs`, `compat.rs`: platform version compatibility
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod compat;
pub(crate) mod logs;
pub(crate) mod output;
pub(crate) mod probe;
pub(crate) mod target;
pub(crate) mod version;

pub use cli::run;
