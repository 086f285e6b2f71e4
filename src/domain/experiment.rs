use std::path::PathBuf;
use std::str::FromStr;

use crate::api::experiment_dto::ExperimentDto;
use crate::domain::metrics::aggregator::LINK_CAPACITY_KBPS;
use crate::domain::placement::placement_mode::PlacementMode;
use crate::domain::placement::policy::EDGE_CPU_THRESHOLD;
use crate::domain::report::report_sink::DEFAULT_RESULTS_FILE;
use crate::domain::scenario::scenario::WorkloadScenario;
use crate::domain::workload::generator::validate_workload;
use crate::error::{Error, Result};

pub const DEFAULT_EDGE_COUNT: usize = 3;
pub const DEFAULT_WORKLOADS: [u32; 5] = [20, 40, 60, 80, 100];

/// Simulation time after which every run is cut off.
pub const SIMULATION_DEADLINE: f64 = 2000.0;

/// Parameters of one batch. `Default` is the fixed two-pass batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentConfig {
    pub edge_count: usize,
    pub edge_cpu_threshold: f64,
    pub link_capacity_kbps: f64,
    pub workloads: Vec<u32>,
    pub modes: Vec<PlacementMode>,
    pub simulation_deadline: f64,
    pub results_path: PathBuf,
    pub analytics_log: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            edge_count: DEFAULT_EDGE_COUNT,
            edge_cpu_threshold: EDGE_CPU_THRESHOLD,
            link_capacity_kbps: LINK_CAPACITY_KBPS,
            workloads: DEFAULT_WORKLOADS.to_vec(),
            modes: vec![PlacementMode::CloudOnly, PlacementMode::fog_edge_assisted()],
            simulation_deadline: SIMULATION_DEADLINE,
            results_path: PathBuf::from(DEFAULT_RESULTS_FILE),
            analytics_log: None,
            seed: None,
        }
    }
}

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.edge_count == 0 {
            return Err(Error::InvalidConfig("edgeCount must be at least 1".to_string()));
        }
        if !(self.edge_cpu_threshold > 0.0 && self.edge_cpu_threshold <= 1.0) {
            return Err(Error::InvalidConfig(format!("edgeCpuThreshold {} must be in (0, 1]", self.edge_cpu_threshold)));
        }
        if self.link_capacity_kbps <= 0.0 {
            return Err(Error::InvalidConfig(format!("linkCapacityKbps {} must be positive", self.link_capacity_kbps)));
        }
        if self.simulation_deadline <= 0.0 {
            return Err(Error::InvalidConfig(format!("simulationDeadline {} must be positive", self.simulation_deadline)));
        }
        if self.workloads.is_empty() || self.modes.is_empty() {
            return Err(Error::InvalidConfig("at least one workload and one mode are required".to_string()));
        }
        for workload in &self.workloads {
            validate_workload(*workload).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }
        Ok(())
    }

    /// Mode-major batch plan: every workload under the first mode, then under
    /// the next one.
    pub fn scenarios(&self) -> Result<Vec<WorkloadScenario>> {
        self.modes
            .iter()
            .flat_map(|mode| self.workloads.iter().map(move |workload| (*mode, *workload)))
            .map(|(mode, workload)| WorkloadScenario::new(workload, mode.with_threshold(self.edge_cpu_threshold)))
            .collect()
    }
}

impl TryFrom<ExperimentDto> for ExperimentConfig {
    type Error = Error;

    fn try_from(dto: ExperimentDto) -> Result<Self> {
        let defaults = ExperimentConfig::default();

        let modes = match dto.modes {
            Some(modes) => modes.iter().map(|mode| PlacementMode::from_str(mode)).collect::<Result<Vec<_>>>()?,
            None => defaults.modes,
        };

        let config = ExperimentConfig {
            edge_count: dto.edge_count.unwrap_or(defaults.edge_count),
            edge_cpu_threshold: dto.edge_cpu_threshold.unwrap_or(defaults.edge_cpu_threshold),
            link_capacity_kbps: dto.link_capacity_kbps.unwrap_or(defaults.link_capacity_kbps),
            workloads: dto.workloads.unwrap_or(defaults.workloads),
            modes,
            simulation_deadline: dto.simulation_deadline.unwrap_or(defaults.simulation_deadline),
            results_path: dto.results_path.map(PathBuf::from).unwrap_or(defaults.results_path),
            analytics_log: dto.analytics_log.map(PathBuf::from),
            seed: dto.seed,
        };

        config.validate()?;
        Ok(config)
    }
}
