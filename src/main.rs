use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use fog_placement_sim::domain::experiment::ExperimentConfig;
use fog_placement_sim::domain::utils::statistics::init_analytics;
use fog_placement_sim::loader::parser::load_experiment_config;
use fog_placement_sim::{logger, run_experiment};

/// Compares cloud-only and fog/edge-assisted placement of a video analytics
/// application over a range of workload intensities.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Experiment file (JSON). Without it the default batch is run.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// CSV file the report rows are appended to.
    #[arg(short, long)]
    results: Option<PathBuf>,

    /// Seed for sensor jitter and module sizing.
    #[arg(short, long)]
    seed: Option<u64>,

    /// File receiving one structured event per finished scenario.
    #[arg(long)]
    analytics_log: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => load_experiment_config(path).with_context(|| format!("loading experiment '{}'", path.display()))?,
        None => ExperimentConfig::default(),
    };

    if let Some(results) = cli.results {
        config.results_path = results;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(analytics_log) = cli.analytics_log {
        config.analytics_log = Some(analytics_log);
    }

    let _analytics_guard = match &config.analytics_log {
        Some(path) => Some(init_analytics(path).context("initializing analytics log")?),
        None => None,
    };

    let summary = run_experiment(&config, Box::new(std::io::stdout())).context("running experiment batch")?;

    if summary.skipped > 0 || summary.sink_failures > 0 {
        log::warn!("{} scenarios skipped, {} report rows could not be written.", summary.skipped, summary.sink_failures);
    }
    Ok(())
}

fn main() -> ExitCode {
    logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
