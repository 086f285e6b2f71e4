use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::domain::metrics::aggregator::ScenarioReport;
use crate::error::Result;

pub const DEFAULT_RESULTS_FILE: &str = "simulation_results.csv";

/// Fixed columns every row starts with.
pub const REPORT_HEADER: [&str; 8] =
    ["Workload", "Mode", "Latency_ms", "Throughput_tuples_per_sec", "Bandwidth_Kbps", "Energy_J", "SimTime_s", "TuplesProcessed"];

/// Destination of scenario reports, one row per scenario, append only.
pub trait ReportSink {
    fn append(&mut self, report: &ScenarioReport) -> Result<()>;
}

/// Header of a fresh report file: the fixed prefix plus one column per
/// sensor/gateway pair of the first row.
pub fn header_for(report: &ScenarioReport) -> Vec<String> {
    REPORT_HEADER.iter().map(|column| column.to_string()).chain(report.gateway_latencies.iter().map(|pair| pair.column())).collect()
}

pub fn record_for(report: &ScenarioReport) -> Vec<String> {
    let mut record = vec![
        report.workload_percent.to_string(),
        report.mode.to_string(),
        format!("{:.2}", report.avg_latency_ms),
        format!("{:.2}", report.throughput),
        format!("{:.2}", report.bandwidth_kbps),
        format!("{:.2}", report.energy_j),
        format!("{:.2}", report.sim_time_s),
        report.tuples_processed.to_string(),
    ];
    record.extend(report.gateway_latencies.iter().map(|pair| format!("{:?}", pair.latency)));
    record
}

/// Flat CSV report. The file is opened, appended and closed once per row;
/// the header is written only when the file does not exist yet.
///
/// Rows are not reconciled against the header: if a later scenario has a
/// different set of sensor/gateway pairs, its row is ragged.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    path: PathBuf,
}

impl CsvReportSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl ReportSink for CsvReportSink {
    fn append(&mut self, report: &ScenarioReport) -> Result<()> {
        let write_header = !self.path.exists();

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().flexible(true).terminator(csv::Terminator::Any(b'\n')).from_writer(file);

        if write_header {
            writer.write_record(header_for(report))?;
        }
        writer.write_record(record_for(report))?;
        writer.flush()?;

        log::debug!("Appended report row for {}% ({}) to '{}'.", report.workload_percent, report.mode, self.path.display());
        Ok(())
    }
}
