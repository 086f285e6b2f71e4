pub mod console;
pub mod report_sink;
