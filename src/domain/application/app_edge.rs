use std::fmt;

use serde::Serialize;

use crate::domain::utils::id::{ModuleName, TupleType};

/// Direction a tuple travels in the device hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TupleDirection {
    /// Towards the cloud.
    Up,
    /// Towards the sensors.
    Down,
}

/// Origin of an application edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeSource {
    /// Tuples emitted by sensors of the given tuple type.
    Sensor(TupleType),
    Module(ModuleName),
}

impl fmt::Display for EdgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeSource::Sensor(tuple_type) => write!(f, "{}", tuple_type),
            EdgeSource::Module(module) => write!(f, "{}", module),
        }
    }
}

/// Directed data dependency between a sensor or module and a module.
#[derive(Debug, Clone, PartialEq)]
pub struct AppEdge {
    pub source: EdgeSource,
    pub destination: ModuleName,
    pub tuple_type: TupleType,
    pub direction: TupleDirection,

    /// Processing length (MI) charged at the destination module.
    pub cpu_length: f64,

    /// Network length (bytes) charged on every link the tuple crosses.
    pub nw_length: f64,
}

impl AppEdge {
    pub fn is_sensor_edge(&self) -> bool {
        matches!(self.source, EdgeSource::Sensor(_))
    }
}

/// Number of output tuples of type `output` a module emits per input tuple of
/// type `input`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectivityMapping {
    pub module: ModuleName,
    pub input: TupleType,
    pub output: TupleType,
    pub selectivity: f64,
}
