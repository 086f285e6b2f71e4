use crate::domain::application::application::Application;
use crate::domain::placement::mapping::PlacementMapping;
use crate::domain::simulator::simulator::{RunOutcome, RunOutput, SimulationEngine};
use crate::domain::topology::topology::Topology;
use crate::domain::workload::sensor::Sensor;
use crate::error::{Error, Result};

/// Engine stand-in that answers every run with a preconfigured outcome and
/// remembers what was registered.
#[derive(Debug, Clone)]
pub struct MockEngine {
    pub outcome: RunOutcome,
    pub fail_registration: bool,

    pub init_calls: usize,
    pub run_calls: usize,
    pub registered_devices: usize,
    pub registered_sensors: usize,
    pub last_mapping: Option<PlacementMapping>,
    pub last_deadline: Option<f64>,
}

impl MockEngine {
    pub fn new(outcome: RunOutcome) -> MockEngine {
        MockEngine {
            outcome,
            fail_registration: false,
            init_calls: 0,
            run_calls: 0,
            registered_devices: 0,
            registered_sensors: 0,
            last_mapping: None,
            last_deadline: None,
        }
    }

    pub fn completed(output: RunOutput) -> MockEngine {
        MockEngine::new(RunOutcome::Completed(output))
    }

    pub fn failing(reason: &str) -> MockEngine {
        MockEngine::new(RunOutcome::Failed(reason.to_string()))
    }

    /// Makes `register_devices` fail as if the device model were malformed.
    pub fn with_registration_failure(mut self) -> MockEngine {
        self.fail_registration = true;
        self
    }
}

impl SimulationEngine for MockEngine {
    fn init(&mut self, _entity_count: usize) {
        self.init_calls += 1;
        self.registered_devices = 0;
        self.registered_sensors = 0;
        self.last_mapping = None;
    }

    fn register_devices(&mut self, topology: &Topology) -> Result<()> {
        if self.fail_registration {
            return Err(Error::ModelConstructionError("mock refuses the device model".to_string()));
        }
        self.registered_devices += topology.len();
        Ok(())
    }

    fn register_sensors(&mut self, sensors: &[Sensor]) -> Result<()> {
        self.registered_sensors += sensors.len();
        Ok(())
    }

    fn submit_application(&mut self, _app: &Application, mapping: &PlacementMapping) -> Result<()> {
        self.last_mapping = Some(mapping.clone());
        Ok(())
    }

    fn run_until(&mut self, deadline: f64) -> RunOutcome {
        self.run_calls += 1;
        self.last_deadline = Some(deadline);
        self.outcome.clone()
    }
}
