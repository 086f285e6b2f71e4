use std::fs;
use std::path::Path;

use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use uuid::Uuid;

use crate::domain::metrics::aggregator::ScenarioReport;
use crate::error::{Error, Result};

/// Target of the structured per-scenario events.
pub const ANALYTICS_TARGET: &str = "analytics";

/// Routes every event on [`ANALYTICS_TARGET`] to `path`.
///
/// The returned guard flushes the non-blocking writer when dropped, keep it
/// alive until the batch is done.
pub fn init_analytics(path: &Path) -> Result<WorkerGuard> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file_name = path.file_name().ok_or_else(|| Error::InvalidConfig(format!("Analytics log path '{}' has no file name", path.display())))?;
    let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_timer(LocalTime::new(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")))
        .with_filter(filter_fn(|metadata| metadata.target() == ANALYTICS_TARGET));

    // `set_global_default` leaves the `log` facade to fern.
    tracing::subscriber::set_global_default(tracing_subscriber::registry().with(layer))
        .map_err(|e| Error::InvalidConfig(format!("Analytics subscriber already installed: {}", e)))?;

    log::info!("Analytics events are written to '{}'.", path.display());
    Ok(guard)
}

/// Emits the structured event describing one finished scenario.
pub fn record_scenario(run_id: &Uuid, report: &ScenarioReport) {
    tracing::info!(
        target: ANALYTICS_TARGET,
        RunId = %run_id,
        Workload = report.workload_percent,
        Mode = %report.mode,
        Offloaded = report.offloaded,
        Completed = report.completed,
        LatencyMs = report.avg_latency_ms,
        Throughput = report.throughput,
        BandwidthKbps = report.bandwidth_kbps,
        EnergyJ = report.energy_j,
        SimTimeS = report.sim_time_s,
        TuplesProcessed = report.tuples_processed,
        "Scenario finished"
    );
}
