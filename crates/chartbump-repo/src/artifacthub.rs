//! Artifact Hub package API
//!
//! `GET {base}/{org}/{name}` answers with the package metadata, including
//! every published chart version.

use std::time::Duration;

use async_trait::async_trait;
use chartbump_core::{CoreError, VersionSource};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{RepoError, Result};

/// Public Artifact Hub endpoint for Helm packages
pub const DEFAULT_API_URL: &str = "https://artifacthub.io/api/v1/packages/helm";

/// Subset of the package document we read
#[derive(Debug, Clone, Deserialize)]
pub struct PackageResponse {
    #[serde(default)]
    pub available_versions: Vec<AvailableVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableVersion {
    pub version: String,
}

/// HTTP client bound to one registry base URL
#[derive(Debug, Clone)]
pub struct ArtifactHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl ArtifactHubClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| RepoError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RepoError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("chartbump/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RepoError::NetworkError {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the package document for `org/name`
    pub fn package_url(&self, package: &str) -> Result<String> {
        validate_package(package)?;
        Ok(format!("{}/{}", self.base_url, package))
    }

    /// Every published version of `package`, in registry order
    pub async fn fetch_versions(&self, package: &str) -> Result<Vec<String>> {
        let url = self.package_url(package)?;
        debug!(%url, "fetching package");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RepoError::HttpError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let package: PackageResponse = serde_json::from_slice(&body)?;

        Ok(package
            .available_versions
            .into_iter()
            .map(|v| v.version)
            .collect())
    }
}

#[async_trait]
impl VersionSource for ArtifactHubClient {
    async fn available_versions(&self, package: &str) -> chartbump_core::Result<Vec<String>> {
        self.fetch_versions(package)
            .await
            .map_err(|e| CoreError::resolution(package, e.to_string()))
    }
}

fn is_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Check that `package` is exactly `org/name`
pub fn validate_package(package: &str) -> Result<()> {
    match package.split_once('/') {
        Some((org, name)) if is_segment(org) && is_segment(name) => Ok(()),
        _ => Err(RepoError::InvalidPackage {
            package: package.to_string(),
        }),
    }
}
