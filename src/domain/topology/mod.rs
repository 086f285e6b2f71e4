pub mod device;
pub mod topology;
