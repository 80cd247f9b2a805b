//! Update command - bump every annotated manifest to its latest stable chart

use std::time::Duration;

use chartbump_core::{
    ChartInfo, Config, DiffPreview, DiffTool, FileWriter, Persister, Updater, VersionResolver,
};
use chartbump_repo::ArtifactHubClient;
use tracing::debug;

use crate::display;
use crate::error::{CliError, Result};

pub async fn run(
    config: &Config,
    charts: &[ChartInfo],
    api_url: &str,
    timeout: Duration,
    diff_tool: DiffTool,
) -> Result<()> {
    let client = ArtifactHubClient::new(api_url, timeout)
        .map_err(|e| CliError::usage(format!("--api-url: {}", e)))?;
    let resolver = VersionResolver::new(client).with_timeout(timeout);
    debug!(api_url, ?timeout, dry_run = config.dry_run, "updating {} chart(s)", charts.len());

    if config.dry_run {
        apply(Updater::new(&config.dir, resolver, DiffPreview::stdout(diff_tool)), charts).await
    } else {
        apply(Updater::new(&config.dir, resolver, FileWriter), charts).await
    }
}

async fn apply<P: Persister>(mut updater: Updater<ArtifactHubClient, P>, charts: &[ChartInfo]) -> Result<()> {
    updater.run(charts, display::result).await?;
    Ok(())
}
