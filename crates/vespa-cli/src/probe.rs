//! Target-specific discovery of the platform version.
//!
//! # Design
//! - Cloud targets expose a compatibility descriptor naming the oldest client
//!   they support; the requirement compares the client build against it.
//! - Local targets expose the node state API; the requirement compares the
//!   node version against a minimum derived by [`LocalMinimum`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::version::{LocalMinimum, Version, VersionError, VersionRequirement};

/// Errors raised while probing a target for its version.
#[derive(Debug, Error)]
pub(crate) enum ProbeError {
    #[error("version probe request to {url} failed")]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("version probe to {url} returned status {status}")]
    Status { url: Url, status: StatusCode },
    #[error("version probe to {url} returned a malformed body")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("version probe to {url} returned an invalid version")]
    Version {
        url: Url,
        #[source]
        source: VersionError,
    },
    #[error("client version is unknown for development builds")]
    DevelopmentBuild,
}

/// Capability to discover which versions must be compared for a target.
#[async_trait]
pub(crate) trait VersionProbe: Send + Sync {
    /// Fetch the version pair relevant to this target.
    async fn probe(&self, client: &Client) -> Result<VersionRequirement, ProbeError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompatibilityDescriptor {
    min_version: String,
}

#[derive(Debug, Deserialize)]
struct NodeVersion {
    version: String,
}

/// Fetch the oldest client version a cloud control plane supports.
pub(crate) async fn fetch_min_client_version(
    client: &Client,
    url: &Url,
) -> Result<Version, ProbeError> {
    let descriptor: CompatibilityDescriptor = get_json(client, url).await?;
    parse_version(url, &descriptor.min_version)
}

/// Probe for cloud targets, backed by the compatibility descriptor.
#[derive(Debug, Clone)]
pub(crate) struct CloudDescriptorProbe {
    pub(crate) url: Url,
    pub(crate) client_version: Version,
}

#[async_trait]
impl VersionProbe for CloudDescriptorProbe {
    async fn probe(&self, client: &Client) -> Result<VersionRequirement, ProbeError> {
        if self.client_version.is_zero() {
            return Err(ProbeError::DevelopmentBuild);
        }
        let minimum = fetch_min_client_version(client, &self.url).await?;
        Ok(VersionRequirement {
            current: self.client_version.clone(),
            minimum,
        })
    }
}

/// Probe for local targets, backed by the node state API.
#[derive(Debug, Clone)]
pub(crate) struct LocalStateProbe {
    pub(crate) url: Url,
    pub(crate) minimum: LocalMinimum,
}

#[async_trait]
impl VersionProbe for LocalStateProbe {
    async fn probe(&self, client: &Client) -> Result<VersionRequirement, ProbeError> {
        let state: NodeVersion = get_json(client, &self.url).await?;
        let reported = parse_version(&self.url, &state.version)?;
        let minimum = self.minimum.minimum_for(&reported);
        Ok(VersionRequirement {
            current: reported,
            minimum,
        })
    }
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &Url) -> Result<T, ProbeError> {
    tracing::debug!(%url, "probing target version");
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|source| ProbeError::Request {
            url: url.clone(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(ProbeError::Status {
            url: url.clone(),
            status,
        });
    }

    response.json::<T>().await.map_err(|source| ProbeError::Decode {
        url: url.clone(),
        source,
    })
}

fn parse_version(url: &Url, value: &str) -> Result<Version, ProbeError> {
    value.parse().map_err(|source| ProbeError::Version {
        url: url.clone(),
        source,
    })
}
