use std::io::{self, Write};

use colored::Colorize;

use crate::domain::metrics::aggregator::ScenarioReport;
use crate::domain::placement::placement_mode::PlacementMode;
use crate::domain::workload::sensor::Sensor;

pub fn write_mode_banner(out: &mut dyn Write, mode: PlacementMode, first: bool) -> io::Result<()> {
    if !first {
        writeln!(out)?;
    }
    writeln!(out, "{}", format!("=== {} ===", mode.banner()).bold())
}

pub fn write_offload_notice(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Analytics offloaded to cloud due to heavy workload.")
}

pub fn write_run_start(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Starting simulation...")
}

pub fn write_run_result(out: &mut dyn Write, failure: Option<&str>) -> io::Result<()> {
    match failure {
        None => writeln!(out, "Simulation finished successfully."),
        Some(reason) => writeln!(out, "{}", format!("Simulation failed: {}", reason).red()),
    }
}

/// One line per sensor with its own hop latency to the gateway.
pub fn write_sensor_lines(out: &mut dyn Write, sensors: &[Sensor]) -> io::Result<()> {
    for sensor in sensors {
        writeln!(out, "Sensor {} to gateway {} latency: {:?} ms", sensor.name, sensor.gateway_name, sensor.latency)?;
    }
    Ok(())
}

/// Summary, duration and sensor-to-edge block of a finished scenario.
pub fn write_summary(out: &mut dyn Write, report: &ScenarioReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Workload {}% ({})", report.workload_percent, report.mode)?;
    writeln!(out, "Throughput: {:.2} tuples/sec | Bandwidth: {:.2} Kbps | Energy: {:.2} J", report.throughput, report.bandwidth_kbps, report.energy_j)?;
    writeln!(out, "Average loop latency: {:.2} ms", report.avg_latency_ms)?;
    writeln!(out, "Estimated simulation time: {:.2} sec | Tuples processed: {}", report.sim_time_s, report.tuples_processed)?;

    writeln!(out)?;
    writeln!(out, "--- Sensor to Edge Latencies ---")?;
    for pair in &report.gateway_latencies {
        writeln!(out, "Sensor {} to edge {} latency: {:?} ms", pair.sensor, pair.gateway, pair.latency)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::aggregator::GatewayLatency;
    use crate::domain::utils::id::{DeviceName, SensorName};

    #[test]
    fn test_summary_keeps_names_containing_separator() {
        let report = ScenarioReport {
            workload_percent: 20,
            mode: PlacementMode::CloudOnly,
            offloaded: false,
            avg_latency_ms: 0.0,
            throughput: 0.0,
            bandwidth_kbps: 0.0,
            energy_j: 0.0,
            sim_time_s: 0.0,
            tuples_processed: 0,
            gateway_latencies: vec![GatewayLatency {
                sensor: SensorName::new("cam_to_x"),
                gateway: DeviceName::new("edge-0"),
                latency: 30.0,
            }],
            completed: true,
        };

        let mut out = Vec::new();
        write_summary(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Sensor cam_to_x to edge edge-0 latency: 30.0 ms"), "{}", text);
    }
}
