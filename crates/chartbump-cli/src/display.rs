//! Status lines printed to the terminal

use chartbump_core::{ChartInfo, UpdateResult, UpdateStatus};
use console::style;

use crate::error::CliError;

/// One line per processed manifest; failures are reported by [`error`]
pub fn result(r: &UpdateResult) {
    match r.status {
        UpdateStatus::Updated => println!(
            "{} {}: {} → {}",
            style("✓").green().bold(),
            r.file,
            r.current,
            style(&r.latest).green()
        ),
        UpdateStatus::UpToDate => println!(
            "{} {}: already up to date ({})",
            style("·").dim(),
            r.file,
            r.current
        ),
        UpdateStatus::Error => {}
    }
}

pub fn discovered(charts: &[ChartInfo]) {
    println!(
        "{} discovered {} chart(s) with artifacthub comments:",
        style("→").blue(),
        charts.len()
    );
    for chart in charts {
        println!("  {} → {}", chart.file, style(&chart.repo).cyan());
    }
}

pub fn error(err: &CliError) {
    eprintln!("{} {}", style("✗").red().bold(), err);
}
