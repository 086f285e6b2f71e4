use std::io::Write;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::domain::experiment::ExperimentConfig;
use crate::domain::report::report_sink::CsvReportSink;
use crate::domain::scenario::runner::{BatchSummary, ScenarioRunner};
use crate::domain::simulator::tuple_flow::TupleFlowEngine;
use crate::error::Result;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Runs the whole batch of `config` on the bundled engine, appending rows to
/// `config.results_path` and printing the per-scenario blocks to `out`.
pub fn run_experiment(config: &ExperimentConfig, out: Box<dyn Write>) -> Result<BatchSummary> {
    config.validate()?;
    let scenarios = config.scenarios()?;

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    log::info!(
        "Running {} scenarios on {} edge devices, results go to '{}'.",
        scenarios.len(),
        config.edge_count,
        config.results_path.display()
    );

    let sink = CsvReportSink::new(&config.results_path);
    let mut runner = ScenarioRunner::new(TupleFlowEngine::new(), sink, rng, out, config);
    runner.run_batch(&scenarios)
}
