use std::io::Write;

use rand::rngs::StdRng;

use crate::domain::experiment::ExperimentConfig;
use crate::domain::metrics::aggregator::{ScenarioReport, aggregate};
use crate::domain::report::console;
use crate::domain::report::report_sink::ReportSink;
use crate::domain::scenario::scenario::{ScenarioContext, WorkloadScenario};
use crate::domain::simulator::simulator::{RunOutcome, SimulationEngine};
use crate::domain::utils::statistics;
use crate::error::Result;

/// What became of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioOutcome {
    /// A report was produced. It may be degraded (engine failure) and its row
    /// may have failed to persist.
    Reported(ScenarioReport),
    /// Model construction or registration failed, no row was written.
    Skipped(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub rows_written: usize,
    pub skipped: usize,
    pub degraded: usize,
    pub sink_failures: usize,
}

/// Drives scenarios one after another through build, engine run, metric
/// aggregation and report persistence.
pub struct ScenarioRunner<E: SimulationEngine, S: ReportSink> {
    engine: E,
    sink: S,
    rng: StdRng,
    out: Box<dyn Write>,

    edge_count: usize,
    simulation_deadline: f64,
    link_capacity_kbps: f64,

    summary: BatchSummary,
}

impl<E: SimulationEngine, S: ReportSink> ScenarioRunner<E, S> {
    pub fn new(engine: E, sink: S, rng: StdRng, out: Box<dyn Write>, config: &ExperimentConfig) -> Self {
        Self {
            engine,
            sink,
            rng,
            out,
            edge_count: config.edge_count,
            simulation_deadline: config.simulation_deadline,
            link_capacity_kbps: config.link_capacity_kbps,
            summary: BatchSummary::default(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn summary(&self) -> BatchSummary {
        self.summary
    }

    /// Runs one scenario to its report.
    ///
    /// Construction and registration errors skip the scenario. An engine
    /// failure still yields a (degraded) report. A failed append is logged and
    /// counted, the batch goes on. Only console write errors are returned.
    pub fn run_scenario(&mut self, scenario: WorkloadScenario) -> Result<ScenarioOutcome> {
        let mut context = match ScenarioContext::build(scenario, self.edge_count, &mut self.rng) {
            Ok(context) => context,
            Err(e) if e.is_construction_error() => return Ok(self.skip(&scenario, e.to_string())),
            Err(e) => return Err(e),
        };

        log::debug!(
            "Run {}: {} devices, {} sensors, {} loops for {}% ({}).",
            context.run_id,
            context.topology.len(),
            context.sensors.len(),
            context.application.loops().len(),
            scenario.workload_percent(),
            scenario.mode()
        );

        if context.offloaded() {
            console::write_offload_notice(&mut self.out)?;
        }

        if let Err(e) = self.register(&context) {
            if e.is_construction_error() {
                return Ok(self.skip(&scenario, e.to_string()));
            }
            return Err(e);
        }

        console::write_run_start(&mut self.out)?;
        let outcome = self.engine.run_until(self.simulation_deadline);
        match &outcome {
            RunOutcome::Completed(output) => {
                context.topology.record_energy(output);
                console::write_run_result(&mut self.out, None)?;
            }
            RunOutcome::Failed(reason) => {
                log::error!("Engine run for {}% ({}) failed: {}", scenario.workload_percent(), scenario.mode(), reason);
                console::write_run_result(&mut self.out, Some(reason.as_str()))?;
                self.summary.degraded += 1;
            }
        }
        console::write_sensor_lines(&mut self.out, &context.sensors)?;

        let report =
            aggregate(&scenario, context.offloaded(), &outcome, &context.topology, &context.sensors, self.link_capacity_kbps);
        console::write_summary(&mut self.out, &report)?;
        statistics::record_scenario(&context.run_id, &report);

        match self.sink.append(&report) {
            Ok(()) => self.summary.rows_written += 1,
            Err(e) => {
                log::error!("Could not persist report for {}% ({}): {}", report.workload_percent, report.mode, e);
                self.summary.sink_failures += 1;
            }
        }

        Ok(ScenarioOutcome::Reported(report))
    }

    /// Runs `scenarios` in order, printing a banner whenever the mode changes.
    pub fn run_batch(&mut self, scenarios: &[WorkloadScenario]) -> Result<BatchSummary> {
        self.summary = BatchSummary::default();

        let mut current_mode = None;
        for scenario in scenarios {
            if current_mode != Some(scenario.mode()) {
                console::write_mode_banner(&mut self.out, scenario.mode(), current_mode.is_none())?;
                current_mode = Some(scenario.mode());
            }
            self.run_scenario(*scenario)?;
        }

        writeln!(self.out, "Simulation Done.")?;
        self.out.flush()?;

        log::info!(
            "Batch finished: {} rows written, {} skipped, {} degraded, {} sink failures.",
            self.summary.rows_written,
            self.summary.skipped,
            self.summary.degraded,
            self.summary.sink_failures
        );
        Ok(self.summary)
    }

    fn register(&mut self, context: &ScenarioContext) -> Result<()> {
        self.engine.init(context.topology.len() + context.sensors.len());
        self.engine.register_devices(&context.topology)?;
        self.engine.register_sensors(&context.sensors)?;
        self.engine.submit_application(&context.application, &context.placement.mapping)
    }

    fn skip(&mut self, scenario: &WorkloadScenario, reason: String) -> ScenarioOutcome {
        log::error!("Skipping scenario {}% ({}): {}", scenario.workload_percent(), scenario.mode(), reason);
        self.summary.skipped += 1;
        ScenarioOutcome::Skipped(reason)
    }
}
