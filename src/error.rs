use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse experiment JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write report row: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid experiment configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to build scenario model: {0}")]
    ModelConstructionError(String),

    #[error("Workload intensity {0}% is outside the supported range 1..=100")]
    InvalidWorkload(u32),

    #[error("Device '{0}' is not part of the topology")]
    UnknownDevice(String),

    #[error("Module '{0}' is not declared by the application")]
    UnknownModule(String),
}

impl Error {
    /// Errors raised while building or registering a scenario. Such a scenario
    /// can not yield meaningful metrics and is skipped without a report row.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::ModelConstructionError(_) | Error::InvalidWorkload(_) | Error::UnknownDevice(_) | Error::UnknownModule(_)
        )
    }

    /// Errors raised while persisting a report row.
    pub fn is_report_io_error(&self) -> bool {
        matches!(self, Error::IoError(_) | Error::CsvError(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
