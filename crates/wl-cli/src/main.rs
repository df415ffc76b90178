use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wl_cli::commands::{analyze, file, gaps};
use wl_cli::{Cli, Commands, Config};

/// Load configuration from the default locations plus an optional file.
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Analyze { dir, json }) => {
            let config = load_config(cli.config.as_deref())?;
            analyze::run(dir, &config.analysis_options(), *json)?;
        }
        Some(Commands::File { path, json }) => {
            let config = load_config(cli.config.as_deref())?;
            file::run(path, &config.analysis_options(), *json)?;
        }
        Some(Commands::Gaps {
            path,
            threshold,
            json,
        }) => {
            let config = load_config(cli.config.as_deref())?;
            let threshold = threshold.unwrap_or(config.gap_threshold_secs);
            gaps::run(path, threshold, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
