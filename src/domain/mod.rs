pub mod application;
pub mod experiment;
pub mod metrics;
pub mod placement;
pub mod report;
pub mod scenario;
pub mod simulator;
pub mod topology;
pub mod utils;
pub mod workload;
