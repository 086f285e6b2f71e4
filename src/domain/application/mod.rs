pub mod app_edge;
pub mod app_loop;
pub mod app_module;
pub mod application;
