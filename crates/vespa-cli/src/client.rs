//! Shared client utilities, error types, and HTTP wiring for the CLI.

use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};

use crate::target::Target;
use crate::version::Version;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// Client build version, injected at compile time by release builds.
pub(crate) const BUILD_VERSION: &str = match option_env!("VESPA_CLI_BUILD_VERSION") {
    Some(version) => version,
    None => "0.0.0",
};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure {
        error: anyhow::Error,
        hints: Vec<String>,
    },
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure {
            error: error.into(),
            hints: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_hint(self, hint: impl Into<String>) -> Self {
        match self {
            Self::Validation(message) => Self::Validation(message),
            Self::Failure { error, mut hints } => {
                hints.push(hint.into());
                Self::Failure { error, hints }
            }
        }
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure { .. } => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure { error, .. } => format!("{error:#}"),
        }
    }

    pub(crate) fn hints(&self) -> &[String] {
        match self {
            Self::Validation(_) => &[],
            Self::Failure { hints, .. } => hints,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

/// Build the HTTP client shared by every request of one invocation.
pub(crate) fn build_http_client(timeout: Duration, trace_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    Client::builder()
        .timeout(timeout)
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Application context passed to command handlers.
#[derive(Debug)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) target: Target,
    pub(crate) client_version: Version,
}

/// Parse a URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_rejects_invalid_input() {
        let err = parse_url("not-a-url").expect_err("invalid URL should fail");
        assert!(err.contains("invalid URL"));
    }

    #[test]
    fn failure_renders_context_chain_and_hints() {
        let error = anyhow!("got status 404")
            .context("failed to read logs")
            .context("could not retrieve logs");
        let err = CliError::failure(error).with_hint("check the platform version");
        assert_eq!(
            err.display_message(),
            "could not retrieve logs: failed to read logs: got status 404"
        );
        assert_eq!(err.hints(), ["check the platform version".to_string()]);
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn validation_errors_carry_no_hints() {
        let err = CliError::validation("invalid period").with_hint("ignored");
        assert_eq!(err.display_message(), "invalid period");
        assert!(err.hints().is_empty());
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn build_http_client_rejects_invalid_trace_ids() {
        assert!(build_http_client(Duration::from_secs(1), "trace").is_ok());
        assert!(build_http_client(Duration::from_secs(1), "bad\ntrace").is_err());
    }

    #[test]
    fn build_version_parses() {
        assert!(BUILD_VERSION.parse::<Version>().is_ok());
    }
}
