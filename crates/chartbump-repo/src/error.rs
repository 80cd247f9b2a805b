//! Error types for registry operations

use thiserror::Error;

/// Artifact Hub client errors
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid package identifier '{package}' (expected org/name)")]
    InvalidPackage { package: String },

    #[error("invalid registry URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("artifacthub HTTP {status}")]
    HttpError { status: u16 },

    #[error("fetch versions from artifacthub: {message}")]
    NetworkError { message: String },

    #[error("request to artifacthub timed out")]
    Timeout,

    #[error("decode artifacthub response: {0}")]
    Serialization(String),
}

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<reqwest::Error> for RepoError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RepoError::Timeout
        } else if let Some(status) = e.status() {
            RepoError::HttpError {
                status: status.as_u16(),
            }
        } else {
            RepoError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}
