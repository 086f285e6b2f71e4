use rand::SeedableRng;
use rand::rngs::StdRng;

use fog_placement_sim::domain::metrics::aggregator::{LINK_CAPACITY_KBPS, aggregate, gateway_latencies};
use fog_placement_sim::domain::placement::placement_mode::PlacementMode;
use fog_placement_sim::domain::scenario::scenario::WorkloadScenario;
use fog_placement_sim::domain::simulator::simulator::{RunOutcome, RunOutput};
use fog_placement_sim::domain::topology::topology::build_topology;
use fog_placement_sim::domain::utils::id::{DeviceName, SensorName};
use fog_placement_sim::domain::workload::generator::generate_sensors;

fn output_with_loops(samples: &[(usize, f64, u64)]) -> RunOutput {
    let mut output = RunOutput::new();
    for (loop_id, latency, count) in samples {
        output.set_loop_stats(*loop_id, *latency, *count);
    }
    output
}

#[test]
fn test_fog_edge_local_bandwidth() {
    let topology = build_topology(3).unwrap();
    let sensors = generate_sensors(&topology, 60, &mut StdRng::seed_from_u64(0)).unwrap();
    let scenario = WorkloadScenario::new(60, PlacementMode::fog_edge_assisted()).unwrap();

    let outcome = RunOutcome::Completed(RunOutput::new());
    let report = aggregate(&scenario, false, &outcome, &topology, &sensors, LINK_CAPACITY_KBPS);

    assert!((report.bandwidth_kbps - 900.0).abs() < 1e-9);
}

#[test]
fn test_bandwidth_per_profile() {
    let topology = build_topology(3).unwrap();
    let sensors = generate_sensors(&topology, 100, &mut StdRng::seed_from_u64(0)).unwrap();
    let outcome = RunOutcome::Completed(RunOutput::new());

    let cloud = WorkloadScenario::new(100, PlacementMode::CloudOnly).unwrap();
    let report = aggregate(&cloud, false, &outcome, &topology, &sensors, LINK_CAPACITY_KBPS);
    assert!((report.bandwidth_kbps - 7000.0).abs() < 1e-9);

    let fog = WorkloadScenario::new(100, PlacementMode::fog_edge_assisted()).unwrap();
    let report = aggregate(&fog, true, &outcome, &topology, &sensors, LINK_CAPACITY_KBPS);
    assert!((report.bandwidth_kbps - 6000.0).abs() < 1e-9);
    assert!(report.offloaded);
}

#[test]
fn test_latency_tuples_and_throughput() {
    let topology = build_topology(3).unwrap();
    let sensors = generate_sensors(&topology, 20, &mut StdRng::seed_from_u64(0)).unwrap();
    let scenario = WorkloadScenario::new(20, PlacementMode::CloudOnly).unwrap();

    let output = output_with_loops(&[(0, 100.0, 20), (1, 110.0, 20), (2, 120.0, 20)]);
    let report = aggregate(&scenario, false, &RunOutcome::Completed(output), &topology, &sensors, LINK_CAPACITY_KBPS);

    assert!((report.avg_latency_ms - 110.0).abs() < 1e-9);
    assert_eq!(report.tuples_processed, 60);
    // 1 s period, 60 tuples over 3 edges
    assert!((report.sim_time_s - 20.0).abs() < 1e-9);
    assert!((report.throughput - 3.0).abs() < 1e-9);
    assert!(report.completed);
}

#[test]
fn test_energy_includes_cloud() {
    let mut topology = build_topology(2).unwrap();
    let sensors = generate_sensors(&topology, 20, &mut StdRng::seed_from_u64(0)).unwrap();
    let scenario = WorkloadScenario::new(20, PlacementMode::CloudOnly).unwrap();

    let mut output = RunOutput::new();
    output.set_device_energy(DeviceName::new("cloud"), 1000.0);
    output.set_device_energy(DeviceName::new("edge-0"), 10.0);
    output.set_device_energy(DeviceName::new("edge-1"), 5.5);
    topology.record_energy(&output);

    let report = aggregate(&scenario, false, &RunOutcome::Completed(output), &topology, &sensors, LINK_CAPACITY_KBPS);
    assert!((report.energy_j - 1015.5).abs() < 1e-9);
}

#[test]
fn test_energy_comes_from_recorded_topology() {
    let topology = build_topology(2).unwrap();
    let sensors = generate_sensors(&topology, 20, &mut StdRng::seed_from_u64(0)).unwrap();
    let scenario = WorkloadScenario::new(20, PlacementMode::CloudOnly).unwrap();

    // Nothing recorded on the devices yet.
    let mut output = RunOutput::new();
    output.set_device_energy(DeviceName::new("cloud"), 1000.0);

    let report = aggregate(&scenario, false, &RunOutcome::Completed(output), &topology, &sensors, LINK_CAPACITY_KBPS);
    assert_eq!(report.energy_j, 0.0);
}

#[test]
fn test_no_tuples_gives_zero_throughput() {
    let topology = build_topology(3).unwrap();
    let sensors = generate_sensors(&topology, 40, &mut StdRng::seed_from_u64(0)).unwrap();
    let scenario = WorkloadScenario::new(40, PlacementMode::CloudOnly).unwrap();

    let report = aggregate(&scenario, false, &RunOutcome::Completed(RunOutput::new()), &topology, &sensors, LINK_CAPACITY_KBPS);

    assert_eq!(report.avg_latency_ms, 0.0);
    assert_eq!(report.tuples_processed, 0);
    assert_eq!(report.sim_time_s, 0.0);
    assert_eq!(report.throughput, 0.0);
    assert!(report.throughput.is_finite());
}

#[test]
fn test_failed_run_is_zero_filled_except_bandwidth() {
    let topology = build_topology(3).unwrap();
    let sensors = generate_sensors(&topology, 80, &mut StdRng::seed_from_u64(0)).unwrap();
    let scenario = WorkloadScenario::new(80, PlacementMode::CloudOnly).unwrap();

    let report = aggregate(&scenario, false, &RunOutcome::Failed("boom".to_string()), &topology, &sensors, LINK_CAPACITY_KBPS);

    assert!(!report.completed);
    assert_eq!(report.avg_latency_ms, 0.0);
    assert_eq!(report.energy_j, 0.0);
    assert_eq!(report.tuples_processed, 0);
    assert!((report.bandwidth_kbps - 5600.0).abs() < 1e-9);
    assert_eq!(report.gateway_latencies.len(), 3);
}

#[test]
fn test_gateway_latencies_use_uplink_latency() {
    let topology = build_topology(3).unwrap();
    let sensors = generate_sensors(&topology, 20, &mut StdRng::seed_from_u64(0)).unwrap();

    let latencies = gateway_latencies(&sensors, &topology);
    let columns: Vec<(String, f64)> = latencies.iter().map(|pair| (pair.column(), pair.latency)).collect();
    assert_eq!(
        columns,
        vec![
            ("sensor-0_to_edge-0".to_string(), 30.0),
            ("sensor-1_to_edge-1".to_string(), 35.0),
            ("sensor-2_to_edge-2".to_string(), 40.0),
        ]
    );
    assert_eq!(latencies[1].sensor, SensorName::new("sensor-1"));
    assert_eq!(latencies[1].gateway, DeviceName::new("edge-1"));
}
