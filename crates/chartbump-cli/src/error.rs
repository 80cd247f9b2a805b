//! CLI error types with exit code handling

use chartbump_core::CoreError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Contradictory or malformed options
    #[error("{message}")]
    #[diagnostic(code(chartbump::cli::usage), help("run with --help for usage"))]
    Usage { message: String },

    /// Discovery found no annotated manifest
    #[error("no charts with artifacthub comments found in {dir}")]
    #[diagnostic(
        code(chartbump::cli::no_charts),
        help("annotate the first key of an Application with '# artifacthub: org/name'")
    )]
    NoCharts { dir: String },

    /// A manifest failed to update
    #[error(transparent)]
    #[diagnostic(code(chartbump::cli::manifest))]
    Manifest(CoreError),

    /// Any other core failure (directory access and the like)
    #[error(transparent)]
    #[diagnostic(code(chartbump::cli::error))]
    Core(CoreError),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::NoCharts { .. } => exit_codes::ERROR,
            CliError::Manifest(_) => exit_codes::ERROR,
            CliError::Core(_) => exit_codes::ERROR,
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidConfig { message } => CliError::Usage { message },
            err @ CoreError::Manifest { .. } => CliError::Manifest(err),
            err => CliError::Core(err),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
