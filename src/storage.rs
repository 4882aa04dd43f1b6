use crate::errors::DatasetError;
use crate::models::Dataset;
use crate::stats::DATE_FORMAT;
use chrono::NaiveDate;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;

pub fn resolve_data_path() -> PathBuf {
    match env::var("AB_DATA_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => PathBuf::from("data/data.json"),
    }
}

/// Reads and parses the dataset file. The dataset is loaded once at
/// startup and never mutated, so any problem here is fatal rather than
/// papered over with an empty default.
pub async fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    let bytes = fs::read(path)
        .await
        .map_err(|err| DatasetError::Read(path.to_path_buf(), err))?;
    let dataset: Dataset = serde_json::from_slice(&bytes).map_err(DatasetError::Parse)?;
    validate(&dataset)?;
    Ok(dataset)
}

fn validate(dataset: &Dataset) -> Result<(), DatasetError> {
    for record in &dataset.data {
        if NaiveDate::parse_from_str(&record.date, DATE_FORMAT).is_err() {
            return Err(DatasetError::InvalidDate(record.date.clone()));
        }
    }
    Ok(())
}
