//! Run configuration

use std::path::PathBuf;

use crate::error::{CoreError, Result};

/// Directory scanned when none is given
pub const DEFAULT_DIR: &str = "argoapps";

/// What a run operates on and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the manifests
    pub dir: PathBuf,
    /// Preview changes as a diff instead of writing them
    pub dry_run: bool,
    /// Only list annotated manifests
    pub check_only: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DIR),
            dry_run: false,
            check_only: false,
        }
    }
}

impl Config {
    /// Reject contradictory modes
    pub fn validate(&self) -> Result<()> {
        if self.dry_run && self.check_only {
            return Err(CoreError::InvalidConfig {
                message: "--dry-run and --check cannot be used together".to_string(),
            });
        }
        Ok(())
    }
}
