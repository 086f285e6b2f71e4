pub mod generator;
pub mod sensor;
