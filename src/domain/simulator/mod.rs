pub mod event;
pub mod simulator;
pub mod simulator_mock;
pub mod tuple_flow;
