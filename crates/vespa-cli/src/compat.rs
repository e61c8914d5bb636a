//! Client/platform version compatibility checks.
//!
//! Two entry points:
//! - [`CompatibilityGate::explain`] runs after a failed request and decides
//!   whether a version mismatch explains the failure.
//! - [`preflight_check`] warns before a cloud command runs when the client
//!   build is older than the control plane supports. It never blocks.

use std::io::{self, Write};

use reqwest::{Client, Url};

use crate::probe::{VersionProbe, fetch_min_client_version};
use crate::version::Version;

const PLATFORM_HINT_PREFIX: &str = "This command requires a newer version of the Vespa platform";

/// A failure enriched with an optional version-mismatch hint.
#[derive(Debug)]
pub(crate) struct Diagnosis {
    pub(crate) error: anyhow::Error,
    pub(crate) hint: Option<String>,
}

/// Explains request failures in terms of the target's version contract.
pub(crate) struct CompatibilityGate<'a> {
    client: &'a Client,
    probe: &'a dyn VersionProbe,
}

impl<'a> CompatibilityGate<'a> {
    pub(crate) fn new(client: &'a Client, probe: &'a dyn VersionProbe) -> Self {
        Self { client, probe }
    }

    /// Probe the target and attach a hint when its version is too old.
    ///
    /// The original error is always preserved. A failing probe yields the
    /// original error unchanged.
    pub(crate) async fn explain(&self, error: anyhow::Error) -> Diagnosis {
        let requirement = match self.probe.probe(self.client).await {
            Ok(requirement) => requirement,
            Err(probe_error) => {
                tracing::debug!(error = %probe_error, "version probe failed; reporting original error");
                return Diagnosis { error, hint: None };
            }
        };

        match requirement.check() {
            Ok(()) => {
                tracing::debug!(
                    current = %requirement.current,
                    minimum = %requirement.minimum,
                    "target version is compatible"
                );
                Diagnosis { error, hint: None }
            }
            Err(incompatible) => Diagnosis {
                error,
                hint: Some(format!("{PLATFORM_HINT_PREFIX}: {incompatible}")),
            },
        }
    }
}

/// Warn on `err` when the client build is older than the control plane's
/// minimum supported client version.
///
/// Development builds (version `0.0.0`) are never checked, and descriptor
/// failures are only logged.
pub(crate) async fn preflight_check<W: Write>(
    client: &Client,
    descriptor_url: &Url,
    client_version: &Version,
    err: &mut W,
) -> io::Result<()> {
    if client_version.is_zero() {
        return Ok(());
    }

    let minimum = match fetch_min_client_version(client, descriptor_url).await {
        Ok(minimum) => minimum,
        Err(error) => {
            tracing::debug!(error = %error, "skipping client version check");
            return Ok(());
        }
    };

    if client_version < &minimum {
        writeln!(
            err,
            "Warning: client version {client_version} is less than the minimum supported version: {minimum}"
        )?;
        writeln!(err, "Hint: This version of CLI may not work as expected")?;
        writeln!(err, "Hint: Try 'vespa version' to check for a new version")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(deprecated)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use httpmock::prelude::*;

    use crate::probe::ProbeError;
    use crate::version::VersionRequirement;

    struct FixedProbe(Option<VersionRequirement>);

    #[async_trait]
    impl VersionProbe for FixedProbe {
        async fn probe(&self, _client: &Client) -> Result<VersionRequirement, ProbeError> {
            self.0.clone().ok_or(ProbeError::DevelopmentBuild)
        }
    }

    fn requirement(current: &str, minimum: &str) -> FixedProbe {
        FixedProbe(Some(VersionRequirement {
            current: current.parse().expect("version"),
            minimum: minimum.parse().expect("version"),
        }))
    }

    #[tokio::test]
    async fn incompatible_version_adds_hint() {
        let client = Client::new();
        let probe = requirement("8.358.0", "8.359.0");
        let diagnosis = CompatibilityGate::new(&client, &probe)
            .explain(anyhow!("got status 404"))
            .await;
        assert_eq!(diagnosis.error.to_string(), "got status 404");
        assert_eq!(
            diagnosis.hint.as_deref(),
            Some(
                "This command requires a newer version of the Vespa platform: platform version is older than required version: 8.358.0 < 8.359.0"
            )
        );
    }

    #[tokio::test]
    async fn compatible_version_keeps_original_error_only() {
        let client = Client::new();
        let probe = requirement("8.359.0", "8.359.0");
        let diagnosis = CompatibilityGate::new(&client, &probe)
            .explain(anyhow!("got status 500"))
            .await;
        assert_eq!(diagnosis.error.to_string(), "got status 500");
        assert!(diagnosis.hint.is_none());
    }

    #[tokio::test]
    async fn failed_probe_keeps_original_error_only() {
        let client = Client::new();
        let probe = FixedProbe(None);
        let diagnosis = CompatibilityGate::new(&client, &probe)
            .explain(anyhow!("connection refused"))
            .await;
        assert_eq!(diagnosis.error.to_string(), "connection refused");
        assert!(diagnosis.hint.is_none());
    }

    async fn run_preflight(server: &MockServer, client_version: &str) -> String {
        let url: Url = server.url("/cli/v1/").parse().expect("url");
        let version: Version = client_version.parse().expect("version");
        let mut err = Vec::new();
        preflight_check(&Client::new(), &url, &version, &mut err)
            .await
            .expect("write");
        String::from_utf8(err).expect("utf8")
    }

    #[tokio::test]
    async fn preflight_warns_outdated_clients() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/cli/v1/");
            then.status(200).body(r#"{"minVersion": "8.0.0"}"#);
        });

        assert_eq!(
            run_preflight(&server, "7.0.0").await,
            "Warning: client version 7.0.0 is less than the minimum supported version: 8.0.0\nHint: This version of CLI may not work as expected\nHint: Try 'vespa version' to check for a new version\n"
        );
        assert!(run_preflight(&server, "8.0.0").await.is_empty());
    }

    #[tokio::test]
    async fn preflight_skips_development_builds_and_failures() {
        let server = MockServer::start_async().await;
        let descriptor = server.mock(|when, then| {
            when.method(GET).path("/cli/v1/");
            then.status(503);
        });

        assert!(run_preflight(&server, "0.0.0").await.is_empty());
        descriptor.assert_hits(0);
        assert!(run_preflight(&server, "7.0.0").await.is_empty());
        descriptor.assert_hits(1);
    }
}
