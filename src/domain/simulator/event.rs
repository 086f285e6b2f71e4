use serde::Serialize;

use crate::domain::application::app_edge::TupleDirection;
use crate::domain::utils::id::{LoopId, ModuleName, TupleType};

/// A tuple travelling through the application graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tuple {
    pub tuple_type: TupleType,
    pub destination: ModuleName,
    pub direction: TupleDirection,
    pub cpu_length: f64,
    pub nw_length: f64,

    /// Loop the tuple is attributed to, if any.
    pub loop_id: Option<LoopId>,

    /// Index of the loop step the tuple is heading for.
    pub step: usize,

    /// Gateway of the sensor that started the chain.
    pub origin: usize,

    /// Device that processes the tuple.
    pub target: usize,
    pub emitted_at: f64,
}

// EVENTS //////////////////////////////////////////////////////////////////////

/// A sensor emits its next tuple.
#[derive(Clone, Serialize)]
pub struct SensorTick {}

/// A tuple reaches a device, either to be processed there or forwarded.
#[derive(Clone, Serialize)]
pub struct TupleArrived {
    pub tuple: Tuple,
}
