use crate::domain::utils::id::{ModuleName, TupleType};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoopStep {
    Sensor(TupleType),
    Module(ModuleName),
}

/// Ordered path through sensor and module participants. Only used to
/// attribute end-to-end latency, it does not influence routing.
#[derive(Debug, Clone, PartialEq)]
pub struct AppLoop {
    pub steps: Vec<LoopStep>,
}

impl AppLoop {
    pub fn new(steps: Vec<LoopStep>) -> Self {
        Self { steps }
    }

    pub fn sensor_tuple_type(&self) -> Option<&TupleType> {
        match self.steps.first() {
            Some(LoopStep::Sensor(tuple_type)) => Some(tuple_type),
            _ => None,
        }
    }

    pub fn last_module(&self) -> Option<&ModuleName> {
        match self.steps.last() {
            Some(LoopStep::Module(module)) => Some(module),
            _ => None,
        }
    }

    /// Number of module steps, the sensor step excluded.
    pub fn module_hops(&self) -> usize {
        self.steps.iter().filter(|step| matches!(step, LoopStep::Module(_))).count()
    }
}
