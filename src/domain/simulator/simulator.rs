use std::collections::{BTreeMap, HashMap};

use crate::domain::application::application::Application;
use crate::domain::placement::mapping::PlacementMapping;
use crate::domain::topology::topology::Topology;
use crate::domain::utils::id::{DeviceName, LoopId};
use crate::domain::workload::sensor::Sensor;
use crate::error::Result;

/// Boundary towards the discrete-event engine that executes a scenario.
///
/// The scenario runner registers the entities of one scenario, then makes a
/// single blocking `run_until` call. Everything the runner learns about the
/// run comes from the returned [`RunOutcome`].
pub trait SimulationEngine: std::fmt::Debug {
    /// Clears all state of a previous run.
    fn init(&mut self, entity_count: usize);

    fn register_devices(&mut self, topology: &Topology) -> Result<()>;

    fn register_sensors(&mut self, sensors: &[Sensor]) -> Result<()>;

    fn submit_application(&mut self, app: &Application, mapping: &PlacementMapping) -> Result<()>;

    /// Runs to completion or until the clock passes `deadline`.
    fn run_until(&mut self, deadline: f64) -> RunOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopStats {
    pub average_latency: f64,
    pub tuple_count: u64,
}

/// Snapshot of everything a finished run measured.
///
/// Only loops that completed at least once have an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    loop_stats: BTreeMap<LoopId, LoopStats>,
    device_energy: HashMap<DeviceName, f64>,
}

impl RunOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_loop_stats(&mut self, loop_id: LoopId, average_latency: f64, tuple_count: u64) {
        self.loop_stats.insert(loop_id, LoopStats { average_latency, tuple_count });
    }

    /// Adds one latency sample to the running average of `loop_id`.
    pub fn record_loop_latency(&mut self, loop_id: LoopId, latency: f64) {
        let stats = self.loop_stats.entry(loop_id).or_insert(LoopStats { average_latency: 0.0, tuple_count: 0 });
        let n = stats.tuple_count as f64;
        stats.average_latency = (stats.average_latency * n + latency) / (n + 1.0);
        stats.tuple_count += 1;
    }

    pub fn set_device_energy(&mut self, device: DeviceName, energy: f64) {
        self.device_energy.insert(device, energy);
    }

    pub fn loop_average_latency(&self, loop_id: LoopId) -> Option<f64> {
        self.loop_stats.get(&loop_id).map(|s| s.average_latency)
    }

    pub fn loop_tuple_count(&self, loop_id: LoopId) -> u64 {
        self.loop_stats.get(&loop_id).map(|s| s.tuple_count).unwrap_or(0)
    }

    pub fn loop_stats(&self) -> impl Iterator<Item = (LoopId, &LoopStats)> + '_ {
        self.loop_stats.iter().map(|(id, stats)| (*id, stats))
    }

    /// Energy the device consumed during the run, 0 if the engine did not
    /// report the device.
    pub fn device_energy(&self, device: &DeviceName) -> f64 {
        self.device_energy.get(device).copied().unwrap_or(0.0)
    }
}

/// Result of the blocking run call.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunOutput),
    Failed(String),
}

impl RunOutcome {
    pub fn output(&self) -> Option<&RunOutput> {
        match self {
            RunOutcome::Completed(output) => Some(output),
            RunOutcome::Failed(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }
}
