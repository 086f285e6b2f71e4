use rand::SeedableRng;
use rand::rngs::StdRng;

use fog_placement_sim::domain::application::application::{ANALYTICS_MODULE, CLIENT_MODULE};
use fog_placement_sim::domain::placement::placement_mode::PlacementMode;
use fog_placement_sim::domain::scenario::scenario::{ScenarioContext, WorkloadScenario};
use fog_placement_sim::domain::simulator::simulator::{RunOutcome, SimulationEngine};
use fog_placement_sim::domain::simulator::tuple_flow::TupleFlowEngine;
use fog_placement_sim::domain::topology::topology::Topology;
use fog_placement_sim::domain::utils::id::{DeviceName, ModuleName};

const DEADLINE: f64 = 2000.0;

fn registered_engine(workload: u32, mode: PlacementMode) -> (TupleFlowEngine, ScenarioContext) {
    let scenario = WorkloadScenario::new(workload, mode).unwrap();
    let context = ScenarioContext::build(scenario, 3, &mut StdRng::seed_from_u64(5)).unwrap();

    let mut engine = TupleFlowEngine::new();
    engine.init(context.topology.len() + context.sensors.len());
    engine.register_devices(&context.topology).unwrap();
    engine.register_sensors(&context.sensors).unwrap();
    engine.submit_application(&context.application, &context.placement.mapping).unwrap();
    (engine, context)
}

#[test]
fn test_every_loop_records_latency() {
    let (mut engine, context) = registered_engine(40, PlacementMode::CloudOnly);
    assert_eq!(engine.entity_count(), 7);

    let RunOutcome::Completed(output) = engine.run_until(DEADLINE) else {
        panic!("run should complete");
    };

    for loop_id in 0..context.application.loops().len() {
        let latency = output.loop_average_latency(loop_id).unwrap();
        assert!(latency > 0.0, "loop {} latency {}", loop_id, latency);
        assert!(output.loop_tuple_count(loop_id) > 0);
    }
}

#[test]
fn test_edge_placement_is_faster_than_cloud() {
    let (mut cloud_engine, _) = registered_engine(40, PlacementMode::CloudOnly);
    let (mut fog_engine, _) = registered_engine(40, PlacementMode::fog_edge_assisted());

    let cloud = cloud_engine.run_until(DEADLINE);
    let fog = fog_engine.run_until(DEADLINE);

    let cloud_latency = cloud.output().unwrap().loop_average_latency(0).unwrap();
    let fog_latency = fog.output().unwrap().loop_average_latency(0).unwrap();
    assert!(fog_latency < cloud_latency, "fog {} cloud {}", fog_latency, cloud_latency);
}

#[test]
fn test_energy_reported_for_every_device() {
    let (mut engine, context) = registered_engine(60, PlacementMode::CloudOnly);
    let outcome = engine.run_until(DEADLINE);
    let output = outcome.output().unwrap();

    for (_, device) in context.topology.devices() {
        // Idle draw alone is already positive.
        assert!(output.device_energy(&device.name) >= device.idle_power * DEADLINE);
    }
    assert_eq!(output.device_energy(&DeviceName::new("nowhere")), 0.0);
}

#[test]
fn test_same_inputs_same_output() {
    let (mut a, _) = registered_engine(80, PlacementMode::fog_edge_assisted());
    let (mut b, _) = registered_engine(80, PlacementMode::fog_edge_assisted());

    assert_eq!(a.run_until(DEADLINE), b.run_until(DEADLINE));
}

#[test]
fn test_run_without_application_fails() {
    let scenario = WorkloadScenario::new(20, PlacementMode::CloudOnly).unwrap();
    let context = ScenarioContext::build(scenario, 1, &mut StdRng::seed_from_u64(5)).unwrap();

    let mut engine = TupleFlowEngine::new();
    engine.init(2);
    engine.register_devices(&context.topology).unwrap();

    assert!(matches!(engine.run_until(DEADLINE), RunOutcome::Failed(_)));
}

#[test]
fn test_run_without_devices_fails() {
    let mut engine = TupleFlowEngine::new();
    engine.init(0);
    engine.register_devices(&Topology::new()).unwrap();

    assert!(!engine.run_until(DEADLINE).is_completed());
}

#[test]
fn test_init_clears_previous_run() {
    let (mut engine, _) = registered_engine(20, PlacementMode::CloudOnly);
    assert!(engine.run_until(DEADLINE).is_completed());

    engine.init(0);
    assert!(matches!(engine.run_until(DEADLINE), RunOutcome::Failed(_)));
}

#[test]
fn test_sensor_on_unknown_gateway_rejected() {
    let (_, context) = registered_engine(20, PlacementMode::CloudOnly);

    let mut engine = TupleFlowEngine::new();
    engine.init(3);
    let err = engine.register_sensors(&context.sensors).unwrap_err();
    assert!(err.is_construction_error());
}

#[test]
fn test_hosts_follow_submitted_mapping() {
    let (cloud_engine, _) = registered_engine(40, PlacementMode::CloudOnly);
    assert_eq!(cloud_engine.hosts_of(&ModuleName::new(ANALYTICS_MODULE)), vec![DeviceName::new("cloud")]);
    assert_eq!(cloud_engine.hosts_of(&ModuleName::new(CLIENT_MODULE)).len(), 3);
    assert!(cloud_engine.hosts_of(&ModuleName::new("unknown")).is_empty());
}

#[test]
fn test_busy_cloud_draws_more_than_idle() {
    let (mut engine, context) = registered_engine(100, PlacementMode::CloudOnly);
    let outcome = engine.run_until(DEADLINE);
    let output = outcome.output().unwrap();

    let cloud = context.topology.cloud().unwrap();
    assert!(output.device_energy(&cloud.name) > cloud.idle_power * DEADLINE);
}
