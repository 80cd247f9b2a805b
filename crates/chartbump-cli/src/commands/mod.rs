//! CLI commands

pub mod check;
pub mod update;

use std::path::Path;

use chartbump_core::ChartInfo;

use crate::error::{CliError, Result};

/// Discover annotated manifests, failing when there are none
pub fn discover(dir: &Path) -> Result<Vec<ChartInfo>> {
    let charts = chartbump_core::discover(dir)?;
    if charts.is_empty() {
        return Err(CliError::NoCharts {
            dir: dir.display().to_string(),
        });
    }
    Ok(charts)
}
