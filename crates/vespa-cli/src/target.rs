//! Deployment targets and their endpoint layout.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use reqwest::Url;
use thiserror::Error;

use crate::probe::{CloudDescriptorProbe, LocalStateProbe, VersionProbe};
use crate::version::{LocalMinimum, Version};

const LOCAL_LOGS_PATH: &str = "/application/v2/tenant/default/application/default/environment/prod/region/default/instance/default/logs";
const LOCAL_VERSION_PATH: &str = "/state/v1/version";
const CLOUD_COMPATIBILITY_PATH: &str = "/cli/v1/";

/// Errors raised while assembling a target from configuration.
#[derive(Debug, Error)]
pub(crate) enum TargetError {
    #[error("an application is required for cloud targets (pass --application or set VESPA_CLI_APPLICATION)")]
    MissingApplication,
    #[error("invalid application '{0}': expected tenant.application[.instance]")]
    InvalidApplication(String),
    #[error("invalid zone '{0}': expected environment.region")]
    InvalidZone(String),
    #[error("invalid target URL")]
    Url(#[from] url::ParseError),
}

/// Kind of deployment the CLI talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum TargetKind {
    #[default]
    Local,
    Cloud,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Local => "local",
            Self::Cloud => "cloud",
        })
    }
}

/// Fully qualified application instance on a cloud control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApplicationId {
    pub(crate) tenant: String,
    pub(crate) application: String,
    pub(crate) instance: String,
}

impl FromStr for ApplicationId {
    type Err = TargetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.trim().split('.').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(TargetError::InvalidApplication(input.to_string()));
        }
        match parts.as_slice() {
            [tenant, application] => Ok(Self {
                tenant: (*tenant).to_string(),
                application: (*application).to_string(),
                instance: "default".to_string(),
            }),
            [tenant, application, instance] => Ok(Self {
                tenant: (*tenant).to_string(),
                application: (*application).to_string(),
                instance: (*instance).to_string(),
            }),
            _ => Err(TargetError::InvalidApplication(input.to_string())),
        }
    }
}

/// Environment and region of a cloud deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Zone {
    pub(crate) environment: String,
    pub(crate) region: String,
}

impl FromStr for Zone {
    type Err = TargetError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().split_once('.') {
            Some((environment, region)) if !environment.is_empty() && !region.is_empty() => {
                Ok(Self {
                    environment: environment.to_string(),
                    region: region.to_string(),
                })
            }
            _ => Err(TargetError::InvalidZone(input.to_string())),
        }
    }
}

/// A resolved target: where logs live and how to discover its version.
pub(crate) struct Target {
    pub(crate) kind: TargetKind,
    pub(crate) logs_url: Url,
    /// Compatibility descriptor, only exposed by cloud control planes.
    pub(crate) compatibility_url: Option<Url>,
    pub(crate) probe: Box<dyn VersionProbe>,
}

impl fmt::Debug for Target {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Target")
            .field("kind", &self.kind)
            .field("logs_url", &self.logs_url.as_str())
            .field(
                "compatibility_url",
                &self.compatibility_url.as_ref().map(Url::as_str),
            )
            .finish_non_exhaustive()
    }
}

impl Target {
    /// Target a self-hosted config server.
    pub(crate) fn local(config_server: &Url, minimum: LocalMinimum) -> Result<Self, TargetError> {
        Ok(Self {
            kind: TargetKind::Local,
            logs_url: endpoint(config_server, LOCAL_LOGS_PATH)?,
            compatibility_url: None,
            probe: Box::new(LocalStateProbe {
                url: endpoint(config_server, LOCAL_VERSION_PATH)?,
                minimum,
            }),
        })
    }

    /// Target an application deployed on a cloud control plane.
    pub(crate) fn cloud(
        api: &Url,
        application: &ApplicationId,
        zone: &Zone,
        client_version: Version,
    ) -> Result<Self, TargetError> {
        let logs_path = format!(
            "/application/v4/tenant/{}/application/{}/instance/{}/environment/{}/region/{}/logs",
            application.tenant,
            application.application,
            application.instance,
            zone.environment,
            zone.region
        );
        let compatibility_url = endpoint(api, CLOUD_COMPATIBILITY_PATH)?;
        Ok(Self {
            kind: TargetKind::Cloud,
            logs_url: endpoint(api, &logs_path)?,
            compatibility_url: Some(compatibility_url.clone()),
            probe: Box::new(CloudDescriptorProbe {
                url: compatibility_url,
                client_version,
            }),
        })
    }
}

/// Append an endpoint path to a base URL, keeping any path prefix the base
/// already carries.
fn endpoint(base: &Url, path: &str) -> Result<Url, TargetError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let prefix = format!("{}/", base.path());
        base.set_path(&prefix);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_target_uses_config_server_paths() {
        let server: Url = "http://127.0.0.1:19071".parse().expect("url");
        let target = Target::local(&server, LocalMinimum::default()).expect("target");
        assert_eq!(target.kind, TargetKind::Local);
        assert_eq!(
            target.logs_url.as_str(),
            "http://127.0.0.1:19071/application/v2/tenant/default/application/default/environment/prod/region/default/instance/default/logs"
        );
        assert!(target.compatibility_url.is_none());
    }

    #[test]
    fn cloud_target_uses_application_paths() {
        let api: Url = "https://api.example.com:4443".parse().expect("url");
        let application: ApplicationId = "t1.a1.i1".parse().expect("application");
        let zone: Zone = "dev.aws-us-east-1c".parse().expect("zone");
        let target =
            Target::cloud(&api, &application, &zone, Version::new(8, 0, 0)).expect("target");
        assert_eq!(target.kind, TargetKind::Cloud);
        assert_eq!(
            target.logs_url.as_str(),
            "https://api.example.com:4443/application/v4/tenant/t1/application/a1/instance/i1/environment/dev/region/aws-us-east-1c/logs"
        );
        assert_eq!(
            target.compatibility_url.as_ref().map(Url::as_str),
            Some("https://api.example.com:4443/cli/v1/")
        );
    }

    #[test]
    fn base_url_path_prefix_is_kept() {
        for base in ["http://proxy.example.com/vespa/", "http://proxy.example.com/vespa"] {
            let server: Url = base.parse().expect("url");
            let target = Target::local(&server, LocalMinimum::default()).expect("target");
            assert_eq!(
                target.logs_url.as_str(),
                "http://proxy.example.com/vespa/application/v2/tenant/default/application/default/environment/prod/region/default/instance/default/logs"
            );
        }

        let api: Url = "https://proxy.example.com/cloud/".parse().expect("url");
        let application: ApplicationId = "t1.a1".parse().expect("application");
        let zone: Zone = "prod.aws-us-east-1c".parse().expect("zone");
        let target =
            Target::cloud(&api, &application, &zone, Version::new(8, 0, 0)).expect("target");
        assert_eq!(
            target.logs_url.as_str(),
            "https://proxy.example.com/cloud/application/v4/tenant/t1/application/a1/instance/default/environment/prod/region/aws-us-east-1c/logs"
        );
        assert_eq!(
            target.compatibility_url.as_ref().map(Url::as_str),
            Some("https://proxy.example.com/cloud/cli/v1/")
        );
    }

    #[test]
    fn endpoint_rejects_opaque_base_urls() {
        let base: Url = "mailto:ops@example.com".parse().expect("url");
        assert!(matches!(
            endpoint(&base, LOCAL_VERSION_PATH),
            Err(TargetError::Url(_))
        ));
    }

    #[test]
    fn application_ids_default_the_instance() {
        let id: ApplicationId = "t1.a1".parse().expect("application");
        assert_eq!(id.instance, "default");
        assert!("t1".parse::<ApplicationId>().is_err());
        assert!("t1..i1".parse::<ApplicationId>().is_err());
        assert!("a.b.c.d".parse::<ApplicationId>().is_err());
    }

    #[test]
    fn zones_require_environment_and_region() {
        let zone: Zone = "prod.aws-us-east-1c".parse().expect("zone");
        assert_eq!(zone.environment, "prod");
        assert_eq!(zone.region, "aws-us-east-1c");
        assert!("prod".parse::<Zone>().is_err());
        assert!(".region".parse::<Zone>().is_err());
    }
}
