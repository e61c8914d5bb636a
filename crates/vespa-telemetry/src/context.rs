//! Command-level span helpers.

use tracing::Span;

use crate::init::build_version;

/// Build the root span for a single CLI command invocation.
///
/// The span carries the command name, the request trace identifier, and the
/// client build version recorded by [`crate::init_logging`].
#[must_use]
pub fn command_span(command: &str, trace_id: &str) -> Span {
    tracing::info_span!(
        "command",
        command = %command,
        trace_id = %trace_id,
        client_version = %build_version()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_span_can_be_constructed() {
        let span = command_span("log", "trace");
        let _entered = span.enter();
    }
}
