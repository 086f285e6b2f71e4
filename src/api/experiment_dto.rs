use serde::Deserialize;

/// JSON shape of an experiment file. Every key is optional, missing keys
/// keep the default batch.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperimentDto {
    pub edge_count: Option<usize>,
    pub edge_cpu_threshold: Option<f64>,
    pub link_capacity_kbps: Option<f64>,
    pub workloads: Option<Vec<u32>>,
    pub modes: Option<Vec<String>>,
    pub simulation_deadline: Option<f64>,
    pub results_path: Option<String>,
    pub analytics_log: Option<String>,
    pub seed: Option<u64>,
}
