use crate::domain::topology::device::DeviceKey;
use crate::domain::utils::id::{DeviceName, SensorName, TupleType};

/// Latency of the physical hop between a sensor and its gateway.
pub const SENSOR_HOP_LATENCY: f64 = 5.0;

/// Data source bound to one edge gateway. Created per scenario run.
#[derive(Debug, Clone)]
pub struct Sensor {
    pub name: SensorName,

    /// Tuple type the sensor emits, e.g. `CAMERA_FEED_0`.
    pub tuple_type: TupleType,

    pub gateway: DeviceKey,
    pub gateway_name: DeviceName,

    /// Emission period in milliseconds, jitter included. Always >= 1.
    pub period_ms: u64,

    /// Fixed latency of the sensor -> gateway hop.
    pub latency: f64,
}

impl Sensor {
    /// Period in seconds. The engine emits a tuple every this many clock units.
    pub fn emission_interval(&self) -> f64 {
        self.period_ms as f64 / 1000.0
    }
}
