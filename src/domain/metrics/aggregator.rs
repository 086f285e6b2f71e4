use crate::domain::placement::placement_mode::PlacementMode;
use crate::domain::placement::policy::load_of;
use crate::domain::scenario::scenario::WorkloadScenario;
use crate::domain::simulator::simulator::{RunOutcome, RunOutput};
use crate::domain::topology::topology::Topology;
use crate::domain::utils::id::{DeviceName, SensorName};
use crate::domain::workload::generator::sensor_period_seconds;
use crate::domain::workload::sensor::Sensor;

/// Capacity of the edge uplink the bandwidth estimate is scaled against.
pub const LINK_CAPACITY_KBPS: f64 = 10_000.0;

/// Share of the link capacity a scenario's traffic is assumed to occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficProfile {
    /// Static cloud-only placement, every tuple crosses the uplink.
    CloudBound,
    /// Fog mode escalated to the cloud under load.
    Offloaded,
    /// Fog mode keeping analytics at the edge.
    EdgeLocal,
}

impl TrafficProfile {
    pub fn of(mode: PlacementMode, offloaded: bool) -> Self {
        match (mode, offloaded) {
            (PlacementMode::CloudOnly, _) => TrafficProfile::CloudBound,
            (PlacementMode::FogEdgeAssisted { .. }, true) => TrafficProfile::Offloaded,
            (PlacementMode::FogEdgeAssisted { .. }, false) => TrafficProfile::EdgeLocal,
        }
    }

    pub fn factor(&self) -> f64 {
        match self {
            TrafficProfile::CloudBound => 0.7,
            TrafficProfile::Offloaded => 0.6,
            TrafficProfile::EdgeLocal => 0.15,
        }
    }
}

pub fn bandwidth_factor(mode: PlacementMode, offloaded: bool) -> f64 {
    TrafficProfile::of(mode, offloaded).factor()
}

/// Latency reported for one sensor: its gateway's uplink latency.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayLatency {
    pub sensor: SensorName,
    pub gateway: DeviceName,
    pub latency: f64,
}

impl GatewayLatency {
    /// Report column of this pair, `<sensor>_to_<gateway>`.
    pub fn column(&self) -> String {
        format!("{}_to_{}", self.sensor, self.gateway)
    }
}

/// Derived metrics of one scenario, one row of the persisted report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub workload_percent: u32,
    pub mode: PlacementMode,
    pub offloaded: bool,

    /// Unweighted mean of the per-loop average latencies.
    pub avg_latency_ms: f64,
    pub throughput: f64,
    pub bandwidth_kbps: f64,
    pub energy_j: f64,

    /// Estimated, not measured: jitter-free sensor period times tuples per edge.
    pub sim_time_s: f64,
    pub tuples_processed: u64,

    /// In sensor order.
    pub gateway_latencies: Vec<GatewayLatency>,

    /// False when the engine run failed and the figures are zero-filled.
    pub completed: bool,
}

/// Mean of the per-loop averages of loops that recorded data, 0 without data.
pub fn average_loop_latency(output: &RunOutput) -> f64 {
    let (sum, count) = output.loop_stats().fold((0.0, 0usize), |(sum, count), (_, stats)| (sum + stats.average_latency, count + 1));
    if count > 0 { sum / count as f64 } else { 0.0 }
}

pub fn total_tuples(output: &RunOutput) -> u64 {
    output.loop_stats().map(|(_, stats)| stats.tuple_count).sum()
}

/// Estimated wall-clock duration of the scenario in seconds.
pub fn estimated_duration(workload_percent: u32, total_tuples: u64, edge_count: usize) -> f64 {
    if edge_count == 0 {
        return 0.0;
    }
    sensor_period_seconds(workload_percent) * total_tuples as f64 / edge_count as f64
}

pub fn throughput(total_tuples: u64, duration: f64) -> f64 {
    if duration > 0.0 { total_tuples as f64 / duration } else { 0.0 }
}

/// Latency reported per sensor. This is the gateway's uplink latency towards
/// the cloud, not the sensor's own hop latency to the gateway.
pub fn gateway_latencies(sensors: &[Sensor], topology: &Topology) -> Vec<GatewayLatency> {
    sensors
        .iter()
        .filter_map(|sensor| {
            let gateway = topology.get(sensor.gateway)?;
            Some(GatewayLatency {
                sensor: sensor.name.clone(),
                gateway: gateway.name.clone(),
                latency: gateway.uplink_latency.unwrap_or(0.0),
            })
        })
        .collect()
}

/// Turns the engine's outcome into the report of one scenario. Energy is read
/// from `topology`, which must already hold the run's per-device figures (see
/// [`Topology::record_energy`]). A failed run gives zero latency, tuples,
/// energy, duration and throughput; the bandwidth estimate does not depend on
/// the engine and is always filled in.
pub fn aggregate(
    scenario: &WorkloadScenario,
    offloaded: bool,
    outcome: &RunOutcome,
    topology: &Topology,
    sensors: &[Sensor],
    link_capacity_kbps: f64,
) -> ScenarioReport {
    let workload = scenario.workload_percent();
    let bandwidth_kbps = load_of(workload) * link_capacity_kbps * bandwidth_factor(scenario.mode(), offloaded);

    let (avg_latency_ms, tuples_processed, energy_j) = match outcome.output() {
        Some(output) => (average_loop_latency(output), total_tuples(output), topology.total_energy()),
        None => (0.0, 0, 0.0),
    };

    let sim_time_s = estimated_duration(workload, tuples_processed, topology.edge_count());

    ScenarioReport {
        workload_percent: workload,
        mode: scenario.mode(),
        offloaded,
        avg_latency_ms,
        throughput: throughput(tuples_processed, sim_time_s),
        bandwidth_kbps,
        energy_j,
        sim_time_s,
        tuples_processed,
        gateway_latencies: gateway_latencies(sensors, topology),
        completed: outcome.is_completed(),
    }
}
