use rand::Rng;
use uuid::Uuid;

use crate::domain::application::application::{Application, build_application};
use crate::domain::placement::placement_mode::PlacementMode;
use crate::domain::placement::policy::{PlacementDecision, decide_placement};
use crate::domain::topology::topology::{Topology, build_topology};
use crate::domain::workload::generator::{generate_sensors, validate_workload};
use crate::domain::workload::sensor::Sensor;
use crate::error::Result;

/// Unit of execution: one workload intensity under one placement mode.
/// Produces exactly one report row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkloadScenario {
    workload_percent: u32,
    mode: PlacementMode,
}

impl WorkloadScenario {
    pub fn new(workload_percent: u32, mode: PlacementMode) -> Result<Self> {
        validate_workload(workload_percent)?;
        Ok(Self { workload_percent, mode })
    }

    pub fn workload_percent(&self) -> u32 {
        self.workload_percent
    }

    pub fn mode(&self) -> PlacementMode {
        self.mode
    }
}

/// Everything one scenario run needs, built fresh for every scenario and
/// never shared between runs.
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub run_id: Uuid,
    pub scenario: WorkloadScenario,
    pub topology: Topology,
    pub sensors: Vec<Sensor>,
    pub application: Application,
    pub placement: PlacementDecision,
}

impl ScenarioContext {
    /// Topology -> sensors -> application graph -> placement.
    pub fn build<R: Rng + ?Sized>(scenario: WorkloadScenario, edge_count: usize, rng: &mut R) -> Result<Self> {
        let topology = build_topology(edge_count)?;
        let sensors = generate_sensors(&topology, scenario.workload_percent(), rng)?;
        let application = build_application(topology.edge_count(), rng)?;
        let placement = decide_placement(scenario.mode(), scenario.workload_percent(), &topology);
        placement.mapping.validate(&application, &topology)?;

        Ok(Self { run_id: Uuid::new_v4(), scenario, topology, sensors, application, placement })
    }

    pub fn offloaded(&self) -> bool {
        self.placement.offloaded
    }
}
