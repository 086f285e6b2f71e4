pub mod mapping;
pub mod placement_mode;
pub mod policy;
