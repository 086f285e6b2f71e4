use rand::Rng;

use crate::domain::topology::topology::Topology;
use crate::domain::utils::id::{SensorName, TupleType};
use crate::domain::workload::sensor::{SENSOR_HOP_LATENCY, Sensor};
use crate::error::{Error, Result};

/// Workload percentage at which sensors emit once per second.
const REFERENCE_WORKLOAD: f64 = 20.0;

/// Upper bound (exclusive) of the random jitter added to every period, in ms.
pub const PERIOD_JITTER_MS: u64 = 100;

pub const SENSOR_NAME_PREFIX: &str = "sensor-";
pub const SENSOR_TUPLE_PREFIX: &str = "CAMERA_FEED_";

pub fn validate_workload(workload_percent: u32) -> Result<()> {
    if (1..=100).contains(&workload_percent) { Ok(()) } else { Err(Error::InvalidWorkload(workload_percent)) }
}

fn unclamped_period_ms(workload_percent: u32) -> f64 {
    1000.0 / (workload_percent as f64 / REFERENCE_WORKLOAD)
}

/// Emission period without jitter, truncated to whole milliseconds and never
/// below 1 ms. Higher intensity gives a shorter period.
pub fn base_period_ms(workload_percent: u32) -> u64 {
    (unclamped_period_ms(workload_percent) as u64).max(1)
}

/// Jitter-free sensor period in seconds, as used for the duration estimate.
pub fn sensor_period_seconds(workload_percent: u32) -> f64 {
    unclamped_period_ms(workload_percent).max(1.0) / 1000.0
}

/// Creates one sensor per edge device of `topology`, all sharing one jittered
/// period derived from `workload_percent`.
pub fn generate_sensors<R: Rng + ?Sized>(topology: &Topology, workload_percent: u32, rng: &mut R) -> Result<Vec<Sensor>> {
    validate_workload(workload_percent)?;

    let jitter = rng.random_range(0..PERIOD_JITTER_MS);
    let period_ms = (base_period_ms(workload_percent) + jitter).max(1);

    let sensors: Vec<Sensor> = topology
        .edges()
        .enumerate()
        .map(|(i, (key, edge))| Sensor {
            name: SensorName::new(format!("{}{}", SENSOR_NAME_PREFIX, i)),
            tuple_type: TupleType::new(format!("{}{}", SENSOR_TUPLE_PREFIX, i)),
            gateway: key,
            gateway_name: edge.name.clone(),
            period_ms,
            latency: SENSOR_HOP_LATENCY,
        })
        .collect();

    log::debug!("Generated {} sensors for workload {}% with period {} ms.", sensors.len(), workload_percent, period_ms);
    Ok(sensors)
}
