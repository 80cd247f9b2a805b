//! Latest stable version lookup

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::version;

/// Default bound on a single lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Raw list of published versions for a package
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn available_versions(&self, package: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<T: VersionSource + ?Sized> VersionSource for Box<T> {
    async fn available_versions(&self, package: &str) -> Result<Vec<String>> {
        (**self).available_versions(package).await
    }
}

/// Picks the newest stable version from a [`VersionSource`]
pub struct VersionResolver<S> {
    source: S,
    timeout: Duration,
}

impl<S: VersionSource> VersionResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Latest stable version of `package`
    ///
    /// The source call is dropped when the timeout elapses.
    pub async fn latest(&self, package: &str) -> Result<String> {
        let versions = tokio::time::timeout(self.timeout, self.source.available_versions(package))
            .await
            .map_err(|_| {
                CoreError::resolution(
                    package,
                    format!("timed out after {:?} fetching versions of {}", self.timeout, package),
                )
            })?
            .map_err(|e| match e {
                CoreError::Resolution { .. } => e,
                other => CoreError::resolution(package, other.to_string()),
            })?;

        debug!(package, count = versions.len(), "fetched available versions");

        version::latest_stable(&versions)
            .map(str::to_string)
            .ok_or_else(|| CoreError::resolution(package, "no stable versions found"))
    }
}
