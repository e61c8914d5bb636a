use std::io::Write;

use anyhow::Context;

use crate::client::{CliError, CliResult};
use crate::version::Version;

pub(crate) fn handle_version<O: Write>(client_version: &Version, out: &mut O) -> CliResult<()> {
    writeln!(out, "Vespa CLI version {client_version}")
        .context("failed to write version")
        .map_err(CliError::failure)
}
