use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use schedrec_cli::commands::{intervals, report, slo, timeline};
use schedrec_cli::{Cli, Commands, Config};

/// Load config, folding in any command-line overrides.
fn load_config(
    config_path: Option<&Path>,
    interval: Option<i64>,
    threshold: Option<f64>,
) -> Result<Config> {
    let mut config = Config::load_from(config_path).context("failed to load configuration")?;
    if let Some(interval) = interval {
        config.sample_interval_secs = interval;
    }
    if let Some(threshold) = threshold {
        config.slo_threshold_us = threshold;
    }
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
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Intervals {
            run_dir,
            json,
            csv,
            interval,
        }) => {
            let config = load_config(cli.config.as_deref(), *interval, None)?;
            intervals::run(run_dir, &config, *json, *csv)?;
        }
        Some(Commands::Timeline {
            run_dir,
            json,
            csv,
            interval,
        }) => {
            let config = load_config(cli.config.as_deref(), *interval, None)?;
            timeline::run(run_dir, &config, *json, *csv)?;
        }
        Some(Commands::Report {
            runs,
            json,
            slo,
            interval,
            threshold,
        }) => {
            let config = load_config(cli.config.as_deref(), *interval, *threshold)?;
            report::run(runs, &config, *json, *slo)?;
        }
        Some(Commands::Slo {
            series,
            end_time,
            json,
            interval,
            threshold,
        }) => {
            let config = load_config(cli.config.as_deref(), *interval, *threshold)?;
            slo::run(series, &config, *end_time, *json)?;
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
