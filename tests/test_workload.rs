use rand::SeedableRng;
use rand::rngs::StdRng;

use fog_placement_sim::domain::topology::topology::build_topology;
use fog_placement_sim::domain::workload::generator::{PERIOD_JITTER_MS, base_period_ms, generate_sensors, sensor_period_seconds};
use fog_placement_sim::domain::workload::sensor::SENSOR_HOP_LATENCY;
use fog_placement_sim::error::Error;

#[test]
fn test_base_period_per_workload() {
    assert_eq!(base_period_ms(20), 1000);
    assert_eq!(base_period_ms(40), 500);
    assert_eq!(base_period_ms(60), 333);
    assert_eq!(base_period_ms(80), 250);
    assert_eq!(base_period_ms(100), 200);
}

#[test]
fn test_period_never_increases_with_workload() {
    let mut previous = u64::MAX;
    for workload in 1..=100 {
        let period = base_period_ms(workload);
        assert!(period >= 1);
        assert!(period <= previous, "period grew at workload {}", workload);
        previous = period;
    }
}

#[test]
fn test_estimate_period_is_not_truncated() {
    assert!((sensor_period_seconds(60) - 1.0 / 3.0).abs() < 1e-9);
    assert!((sensor_period_seconds(20) - 1.0).abs() < 1e-9);
}

#[test]
fn test_one_sensor_per_edge() {
    let topology = build_topology(3).unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let sensors = generate_sensors(&topology, 40, &mut rng).unwrap();
    assert_eq!(sensors.len(), 3);

    for (i, ((_, edge), sensor)) in topology.edges().zip(&sensors).enumerate() {
        assert_eq!(sensor.name.to_string(), format!("sensor-{}", i));
        assert_eq!(sensor.tuple_type.to_string(), format!("CAMERA_FEED_{}", i));
        assert_eq!(sensor.gateway_name, edge.name);
        assert!(edge.is_edge());
        assert_eq!(sensor.latency, SENSOR_HOP_LATENCY);
    }
}

#[test]
fn test_jitter_stays_in_bounds_and_is_shared() {
    let topology = build_topology(3).unwrap();

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let sensors = generate_sensors(&topology, 100, &mut rng).unwrap();

        let period = sensors[0].period_ms;
        assert!(period >= base_period_ms(100));
        assert!(period < base_period_ms(100) + PERIOD_JITTER_MS);
        assert!(sensors.iter().all(|s| s.period_ms == period));
        assert!(sensors[0].emission_interval() > 0.0);
    }
}

#[test]
fn test_same_seed_same_sensors() {
    let topology = build_topology(2).unwrap();
    let a = generate_sensors(&topology, 60, &mut StdRng::seed_from_u64(42)).unwrap();
    let b = generate_sensors(&topology, 60, &mut StdRng::seed_from_u64(42)).unwrap();

    assert_eq!(a[0].period_ms, b[0].period_ms);
}

#[test]
fn test_out_of_range_workload_rejected() {
    let topology = build_topology(1).unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    assert!(matches!(generate_sensors(&topology, 0, &mut rng), Err(Error::InvalidWorkload(0))));
    assert!(matches!(generate_sensors(&topology, 101, &mut rng), Err(Error::InvalidWorkload(101))));
}
