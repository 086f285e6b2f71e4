use std::fs;
use std::path::PathBuf;

use uuid::Uuid;

use fog_placement_sim::domain::experiment::ExperimentConfig;
use fog_placement_sim::domain::placement::placement_mode::PlacementMode;
use fog_placement_sim::error::Error;
use fog_placement_sim::loader::parser::load_experiment_config;

fn write_temp_json(content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("fog_experiment_{}.json", Uuid::new_v4()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_default_batch_plan() {
    let scenarios = ExperimentConfig::default().scenarios().unwrap();
    assert_eq!(scenarios.len(), 10);

    let plan: Vec<(u32, PlacementMode)> = scenarios.iter().map(|s| (s.workload_percent(), s.mode())).collect();
    assert_eq!(plan[0], (20, PlacementMode::CloudOnly));
    assert_eq!(plan[4], (100, PlacementMode::CloudOnly));
    assert_eq!(plan[5], (20, PlacementMode::fog_edge_assisted()));
    assert_eq!(plan[9], (100, PlacementMode::fog_edge_assisted()));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let path = write_temp_json(r#"{ "edgeCount": 5, "workloads": [10, 90], "seed": 3 }"#);
    let config = load_experiment_config(&path).unwrap();

    assert_eq!(config.edge_count, 5);
    assert_eq!(config.workloads, vec![10, 90]);
    assert_eq!(config.seed, Some(3));
    assert_eq!(config.edge_cpu_threshold, 0.8);
    assert_eq!(config.modes.len(), 2);
    assert_eq!(config.simulation_deadline, 2000.0);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_threshold_applies_to_fog_modes() {
    let path = write_temp_json(r#"{ "edgeCpuThreshold": 0.5, "modes": ["FOG_EDGE_ASSISTED"] }"#);
    let config = load_experiment_config(&path).unwrap();

    let scenarios = config.scenarios().unwrap();
    assert_eq!(scenarios.len(), 5);
    assert!(scenarios.iter().all(|s| s.mode() == PlacementMode::FogEdgeAssisted { threshold: 0.5 }));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_invalid_values_rejected() {
    for json in [
        r#"{ "edgeCount": 0 }"#,
        r#"{ "edgeCpuThreshold": 1.5 }"#,
        r#"{ "linkCapacityKbps": 0 }"#,
        r#"{ "simulationDeadline": -1 }"#,
        r#"{ "workloads": [0] }"#,
        r#"{ "workloads": [] }"#,
        r#"{ "modes": ["EDGE_ONLY"] }"#,
    ] {
        let path = write_temp_json(json);
        let result = load_experiment_config(&path);
        assert!(matches!(result, Err(Error::InvalidConfig(_))), "{} should be rejected", json);
        fs::remove_file(&path).unwrap();
    }
}

#[test]
fn test_malformed_json_is_deserialization_error() {
    let path = write_temp_json("{ edgeCount: 3 ");
    assert!(matches!(load_experiment_config(&path), Err(Error::DeserializationError(_))));
    fs::remove_file(&path).unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join(format!("absent_{}.json", Uuid::new_v4()));
    assert!(matches!(load_experiment_config(&path), Err(Error::IoError(_))));
}
