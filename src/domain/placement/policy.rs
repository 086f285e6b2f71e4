use crate::domain::application::application::{ANALYTICS_MODULE, CLIENT_MODULE};
use crate::domain::placement::mapping::PlacementMapping;
use crate::domain::placement::placement_mode::PlacementMode;
use crate::domain::topology::topology::Topology;

/// Load above which the fog mode escalates analytics to the cloud.
pub const EDGE_CPU_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementDecision {
    pub mapping: PlacementMapping,

    /// True only when the fog mode escalated analytics to the cloud because of
    /// load. Static cloud-only placement never sets it.
    pub offloaded: bool,
}

/// Load in `[0, 1]` represented by a workload percentage.
pub fn load_of(workload_percent: u32) -> f64 {
    workload_percent as f64 / 100.0
}

/// Whether analytics escalates to the cloud. Strict comparison: a load equal
/// to the threshold stays at the edge.
pub fn exceeds_threshold(mode: PlacementMode, workload_percent: u32) -> bool {
    match mode {
        PlacementMode::CloudOnly => false,
        PlacementMode::FogEdgeAssisted { threshold } => load_of(workload_percent) > threshold,
    }
}

/// Places the client module on every edge device and the analytics module
/// on the cloud or on every edge device, depending on `mode` and load.
pub fn decide_placement(mode: PlacementMode, workload_percent: u32, topology: &Topology) -> PlacementDecision {
    let mut mapping = PlacementMapping::new();

    for (_, edge) in topology.edges() {
        mapping.add_module_to_device(CLIENT_MODULE, &edge.name);
    }

    let on_cloud = match mode {
        PlacementMode::CloudOnly => true,
        PlacementMode::FogEdgeAssisted { .. } => exceeds_threshold(mode, workload_percent),
    };

    if on_cloud {
        if let Some(cloud) = topology.cloud() {
            mapping.add_module_to_device(ANALYTICS_MODULE, &cloud.name);
        }
    } else {
        for (_, edge) in topology.edges() {
            mapping.add_module_to_device(ANALYTICS_MODULE, &edge.name);
        }
    }

    let offloaded = matches!(mode, PlacementMode::FogEdgeAssisted { .. }) && on_cloud;
    if offloaded {
        log::debug!("Load {:.2} exceeds threshold, analytics escalated to the cloud.", load_of(workload_percent));
    }

    PlacementDecision { mapping, offloaded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::topology::topology::build_topology;
    use crate::domain::utils::id::{DeviceName, ModuleName};

    fn analytics_hosts(decision: &PlacementDecision) -> Vec<String> {
        decision.mapping.devices_for(&ModuleName::new(ANALYTICS_MODULE)).iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_threshold_table() {
        let fog = PlacementMode::fog_edge_assisted();
        let cases = [(20, false), (40, false), (60, false), (79, false), (80, false), (81, true), (100, true)];

        for (workload, expected) in cases {
            assert_eq!(exceeds_threshold(fog, workload), expected, "workload {}", workload);
            assert!(!exceeds_threshold(PlacementMode::CloudOnly, workload), "cloud-only never escalates");
        }
    }

    #[test]
    fn test_cloud_only_never_offloads() {
        let topology = build_topology(3).unwrap();

        for workload in [20, 40, 60, 80, 100] {
            let decision = decide_placement(PlacementMode::CloudOnly, workload, &topology);
            assert!(!decision.offloaded);
            assert_eq!(analytics_hosts(&decision), vec!["cloud".to_string()]);
        }
    }

    #[test]
    fn test_fog_stays_at_edge_on_threshold() {
        let topology = build_topology(3).unwrap();
        let decision = decide_placement(PlacementMode::fog_edge_assisted(), 80, &topology);

        assert!(!decision.offloaded);
        assert_eq!(analytics_hosts(&decision), vec!["edge-0", "edge-1", "edge-2"]);
    }

    #[test]
    fn test_fog_escalates_above_threshold() {
        let topology = build_topology(3).unwrap();
        let decision = decide_placement(PlacementMode::fog_edge_assisted(), 100, &topology);

        assert!(decision.offloaded);
        assert_eq!(analytics_hosts(&decision), vec!["cloud".to_string()]);
    }

    #[test]
    fn test_client_always_on_every_edge() {
        let topology = build_topology(2).unwrap();
        let client = ModuleName::new(CLIENT_MODULE);

        for mode in [PlacementMode::CloudOnly, PlacementMode::fog_edge_assisted()] {
            let decision = decide_placement(mode, 100, &topology);
            assert_eq!(decision.mapping.devices_for(&client), &[DeviceName::new("edge-0"), DeviceName::new("edge-1")]);
            assert!(!decision.mapping.hosts(&client, &DeviceName::new("cloud")));
        }
    }

    #[test]
    fn test_custom_threshold() {
        let topology = build_topology(1).unwrap();
        let strict = PlacementMode::fog_edge_assisted().with_threshold(0.5);

        assert!(decide_placement(strict, 60, &topology).offloaded);
        assert!(!decide_placement(strict, 50, &topology).offloaded);
    }
}
