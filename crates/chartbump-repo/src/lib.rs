//! chartbump registry access
//!
//! [`ArtifactHubClient`] fetches published chart versions from Artifact Hub
//! and plugs into the core resolver as a [`chartbump_core::VersionSource`].
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use chartbump_core::VersionResolver;
//! use chartbump_repo::{ArtifactHubClient, DEFAULT_API_URL};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ArtifactHubClient::new(DEFAULT_API_URL, Duration::from_secs(60))?;
//! let latest = VersionResolver::new(client).latest("bitnami/redis").await?;
//! println!("{latest}");
//! # Ok(())
//! # }
//! ```

pub mod artifacthub;
pub mod error;

pub use artifacthub::{ArtifactHubClient, AvailableVersion, DEFAULT_API_URL, PackageResponse};
pub use error::{RepoError, Result};
