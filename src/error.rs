//! Error type shared by every stage of the cleaning pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// A column the accident key or the year depends on is missing from the header.
    #[error("Required column '{0}' not found in input")]
    MissingColumn(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Imputation weights that do not form a probability distribution.
    #[error("Invalid sex distribution: {0}")]
    InvalidDistribution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
