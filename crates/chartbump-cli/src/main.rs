//! chartbump - keep Argo CD Application Helm charts on their latest stable version

use std::path::PathBuf;
use std::time::Duration;

use chartbump_core::config::DEFAULT_DIR;
use chartbump_core::{Config, DiffTool};
use chartbump_repo::DEFAULT_API_URL;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod error;
mod exit_codes;

const AFTER_HELP: &str = "\
Exit codes:
  0   Success
  1   A manifest failed to update, or no annotated manifest was found
  64  Invalid arguments

Examples:
  chartbump
  chartbump --dir ./my-apps
  chartbump --dry-run
  UPDATE_VERSION_DIR=./my-apps chartbump --check";

#[derive(Parser)]
#[command(name = "chartbump")]
#[command(version)]
#[command(about = "Update Argo CD Application Helm chart versions from Artifact Hub")]
#[command(long_about = "Updates Argo CD Application Helm chart versions by scanning for manifests \
with \"# artifacthub: org/name\" comments and fetching the latest stable version from Artifact Hub.")]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Directory containing Application manifests
    #[arg(short = 'd', long, value_name = "PATH", env = "UPDATE_VERSION_DIR", default_value = DEFAULT_DIR)]
    dir: PathBuf,

    /// Show a diff instead of modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Only list annotated manifests, without contacting Artifact Hub
    #[arg(short = 'C', long)]
    check: bool,

    /// Diff renderer used by --dry-run (builtin or git)
    #[arg(long, value_name = "TOOL", default_value = "builtin")]
    diff_tool: DiffTool,

    /// Artifact Hub Helm package API
    #[arg(long, value_name = "URL", env = "ARTIFACTHUB_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Registry request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    timeout: u64,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default = if debug {
        "chartbump=debug,chartbump_core=debug,chartbump_repo=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> error::Result<()> {
    let config = Config {
        dir: cli.dir,
        dry_run: cli.dry_run,
        check_only: cli.check,
    };
    config.validate()?;

    let charts = commands::discover(&config.dir)?;

    if config.check_only {
        return commands::check::run(&charts);
    }

    commands::update::run(
        &config,
        &charts,
        &cli.api_url,
        Duration::from_secs(cli.timeout),
        cli.diff_tool,
    )
    .await
}

fn main() -> Result<()> {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            e.print().into_diagnostic()?;
            std::process::exit(code);
        }
    };

    init_logging(cli.debug);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    if let Err(e) = runtime.block_on(run(cli)) {
        display::error(&e);
        std::process::exit(e.exit_code());
    }
    Ok(())
}
