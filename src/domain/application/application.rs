use std::collections::HashSet;

use rand::Rng;

use crate::domain::application::app_edge::{AppEdge, EdgeSource, SelectivityMapping, TupleDirection};
use crate::domain::application::app_loop::{AppLoop, LoopStep};
use crate::domain::application::app_module::AppModule;
use crate::domain::utils::id::{ApplicationId, ModuleName, TupleType};
use crate::domain::workload::generator::SENSOR_TUPLE_PREFIX;
use crate::error::{Error, Result};

pub const APPLICATION_ID: &str = "TrafficApp";
pub const CLIENT_MODULE: &str = "clientModule";
pub const ANALYTICS_MODULE: &str = "analyticsModule";

pub const CLIENT_MODULE_RAM: u64 = 100;
pub const ANALYTICS_MODULE_BASE_RAM: u64 = 500;

/// Upper bound (exclusive) of the random extra footprint of the analytics module.
pub const ANALYTICS_MODULE_RAM_JITTER: u64 = 200;

pub const SENSOR_DATA_PREFIX: &str = "SENSOR_DATA_";
pub const ANALYTICS_DATA_PREFIX: &str = "ANALYTICS_DATA_";
pub const CONTROL_SIGNAL_PREFIX: &str = "CONTROL_SIGNAL_";

/// Dataflow description of the application: modules, edges, selectivity
/// mappings and latency-tracking loops.
#[derive(Debug, Clone)]
pub struct Application {
    pub id: ApplicationId,
    modules: Vec<AppModule>,
    edges: Vec<AppEdge>,
    mappings: Vec<SelectivityMapping>,
    loops: Vec<AppLoop>,
}

impl Application {
    pub fn new(id: impl Into<ApplicationId>) -> Self {
        Self { id: id.into(), modules: Vec::new(), edges: Vec::new(), mappings: Vec::new(), loops: Vec::new() }
    }

    pub fn add_module(&mut self, name: &str, ram: u64) -> Result<()> {
        let module = AppModule::new(name, ram);
        if self.module(&module.name).is_some() {
            return Err(Error::ModelConstructionError(format!("Module {} is declared twice in {}", name, self.id)));
        }
        self.modules.push(module);
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        source: EdgeSource,
        destination: &str,
        cpu_length: f64,
        nw_length: f64,
        tuple_type: &str,
        direction: TupleDirection,
    ) {
        self.edges.push(AppEdge {
            source,
            destination: ModuleName::new(destination),
            tuple_type: TupleType::new(tuple_type),
            direction,
            cpu_length,
            nw_length,
        });
    }

    pub fn add_tuple_mapping(&mut self, module: &str, input: &str, output: &str, selectivity: f64) {
        self.mappings.push(SelectivityMapping {
            module: ModuleName::new(module),
            input: TupleType::new(input),
            output: TupleType::new(output),
            selectivity,
        });
    }

    pub fn add_loop(&mut self, app_loop: AppLoop) {
        self.loops.push(app_loop);
    }

    pub fn modules(&self) -> &[AppModule] {
        &self.modules
    }

    pub fn edges(&self) -> &[AppEdge] {
        &self.edges
    }

    pub fn mappings(&self) -> &[SelectivityMapping] {
        &self.mappings
    }

    pub fn loops(&self) -> &[AppLoop] {
        &self.loops
    }

    pub fn module(&self, name: &ModuleName) -> Option<&AppModule> {
        self.modules.iter().find(|m| &m.name == name)
    }

    /// The edge a sensor of `tuple_type` feeds into.
    pub fn sensor_edge(&self, tuple_type: &TupleType) -> Option<&AppEdge> {
        self.edges.iter().find(|e| matches!(&e.source, EdgeSource::Sensor(t) if t == tuple_type))
    }

    /// The edge leaving `module` that carries `tuple_type`.
    pub fn module_edge(&self, module: &ModuleName, tuple_type: &TupleType) -> Option<&AppEdge> {
        self.edges.iter().find(|e| matches!(&e.source, EdgeSource::Module(m) if m == module) && &e.tuple_type == tuple_type)
    }

    /// The mapping `module` applies to incoming tuples of type `input`.
    pub fn mapping_for(&self, module: &ModuleName, input: &TupleType) -> Option<&SelectivityMapping> {
        self.mappings.iter().find(|m| &m.module == module && &m.input == input)
    }

    /// Checks the structural invariants of the graph:
    /// edges end at declared modules, every module-originated edge has exactly
    /// one selectivity mapping producing its tuple type, and every loop only
    /// names known sensors and modules.
    pub fn validate(&self) -> Result<()> {
        let module_names: HashSet<&ModuleName> = self.modules.iter().map(|m| &m.name).collect();

        for edge in &self.edges {
            if !module_names.contains(&edge.destination) {
                return Err(Error::UnknownModule(edge.destination.to_string()));
            }

            let EdgeSource::Module(source) = &edge.source else {
                continue;
            };
            if !module_names.contains(source) {
                return Err(Error::UnknownModule(source.to_string()));
            }

            let producers = self.mappings.iter().filter(|m| &m.module == source && m.output == edge.tuple_type).count();
            if producers != 1 {
                return Err(Error::ModelConstructionError(format!(
                    "Edge {} -> {} carrying {} needs exactly one selectivity mapping in {}, found {}",
                    source, edge.destination, edge.tuple_type, source, producers
                )));
            }
        }

        for mapping in &self.mappings {
            if !module_names.contains(&mapping.module) {
                return Err(Error::UnknownModule(mapping.module.to_string()));
            }
            if !(mapping.selectivity > 0.0 && mapping.selectivity <= 1.0) {
                return Err(Error::ModelConstructionError(format!(
                    "Selectivity {} of {} in {} must be in (0, 1]",
                    mapping.selectivity, mapping.output, mapping.module
                )));
            }
        }

        for (loop_id, app_loop) in self.loops.iter().enumerate() {
            if app_loop.steps.len() < 2 {
                return Err(Error::ModelConstructionError(format!("Loop {} needs at least two participants", loop_id)));
            }
            for step in &app_loop.steps {
                match step {
                    LoopStep::Module(module) if !module_names.contains(module) => return Err(Error::UnknownModule(module.to_string())),
                    LoopStep::Sensor(tuple_type) if self.sensor_edge(tuple_type).is_none() => {
                        return Err(Error::ModelConstructionError(format!("Loop {} starts at {}, which feeds no edge", loop_id, tuple_type)));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

/// Builds the traffic monitoring application for `edge_count` sensor/edge
/// pairs: a client module at the edge and an analytics module whose footprint
/// varies by up to `ANALYTICS_MODULE_RAM_JITTER`.
pub fn build_application<R: Rng + ?Sized>(edge_count: usize, rng: &mut R) -> Result<Application> {
    let mut app = Application::new(APPLICATION_ID);

    app.add_module(CLIENT_MODULE, CLIENT_MODULE_RAM)?;
    app.add_module(ANALYTICS_MODULE, ANALYTICS_MODULE_BASE_RAM + rng.random_range(0..ANALYTICS_MODULE_RAM_JITTER))?;

    for i in 0..edge_count {
        let sensor_tuple = format!("{}{}", SENSOR_TUPLE_PREFIX, i);
        let analytics_data = format!("{}{}", ANALYTICS_DATA_PREFIX, i);
        let control_signal = format!("{}{}", CONTROL_SIGNAL_PREFIX, i);

        app.add_edge(
            EdgeSource::Sensor(TupleType::new(sensor_tuple.as_str())),
            CLIENT_MODULE,
            1000.0,
            2000.0,
            &format!("{}{}", SENSOR_DATA_PREFIX, i),
            TupleDirection::Up,
        );
        app.add_edge(EdgeSource::Module(ModuleName::new(CLIENT_MODULE)), ANALYTICS_MODULE, 2000.0, 4000.0, &analytics_data, TupleDirection::Up);
        app.add_edge(EdgeSource::Module(ModuleName::new(ANALYTICS_MODULE)), CLIENT_MODULE, 1000.0, 500.0, &control_signal, TupleDirection::Down);

        // Sensor tuples are matched by the emitted type, not the edge label.
        app.add_tuple_mapping(CLIENT_MODULE, &sensor_tuple, &analytics_data, 1.0);
        app.add_tuple_mapping(ANALYTICS_MODULE, &analytics_data, &control_signal, 1.0);
    }

    for i in 0..edge_count {
        app.add_loop(AppLoop::new(vec![
            LoopStep::Sensor(TupleType::new(format!("{}{}", SENSOR_TUPLE_PREFIX, i))),
            LoopStep::Module(ModuleName::new(CLIENT_MODULE)),
            LoopStep::Module(ModuleName::new(ANALYTICS_MODULE)),
            LoopStep::Module(ModuleName::new(CLIENT_MODULE)),
        ]));
    }

    app.validate()?;
    Ok(app)
}
