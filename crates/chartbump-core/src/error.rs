//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("decode yaml: {message}")]
    Parse { message: String, line: Option<usize> },

    #[error("encode yaml: {message}")]
    Serialize { message: String },

    #[error("cannot access directory: {path}")]
    NotFound { path: String },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: String },

    #[error("{context} {path}: {source}")]
    Io {
        context: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Resolution { package: String, message: String },

    #[error("{message}")]
    Persist { path: String, message: String },

    #[error("failed to read current version in {file}")]
    MissingVersion { file: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Failure while updating one manifest
    #[error("{file}: {source}")]
    Manifest {
        file: String,
        #[source]
        source: Box<CoreError>,
    },
}

impl CoreError {
    pub(crate) fn parse(message: impl Into<String>, line: usize) -> Self {
        CoreError::Parse {
            message: format!("line {}: {}", line, message.into()),
            line: Some(line),
        }
    }

    pub(crate) fn serialize(message: impl Into<String>) -> Self {
        CoreError::Serialize {
            message: message.into(),
        }
    }

    pub(crate) fn io(context: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        CoreError::Io {
            context,
            path: path.into(),
            source,
        }
    }

    pub fn resolution(package: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Resolution {
            package: package.into(),
            message: message.into(),
        }
    }

    pub(crate) fn persist(path: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::Persist {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by malformed YAML input
    pub fn is_parse(&self) -> bool {
        matches!(self, CoreError::Parse { .. })
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(e: serde_yaml::Error) -> Self {
        CoreError::Parse {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
