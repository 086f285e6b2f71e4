use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::api::experiment_dto::ExperimentDto;
use crate::domain::experiment::ExperimentConfig;
use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;

    let parsed_data: T = serde_json::from_str(&data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

/// Reads and validates an experiment file.
pub fn load_experiment_config(file_path: &Path) -> Result<ExperimentConfig> {
    let dto: ExperimentDto = parse_json_file(file_path)?;
    log::info!("Experiment file '{}' parsed successfully.", file_path.display());

    ExperimentConfig::try_from(dto)
}
