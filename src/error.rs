use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinancialMetricsError {
    #[error("Input is not a summary record: expected a JSON object, got {0}")]
    NotARecord(String),

    #[error("Summary record has no \"Years\" array")]
    MissingPeriods,

    #[error("Invalid analysis options: {0}")]
    InvalidOptions(String),

    #[error("Unsupported destination {0}: expected a .json or .csv path")]
    UnsupportedDestination(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FinancialMetricsError {
    /// True for the two signals that mean "nothing to compute" rather than a failure
    /// worth retrying.
    pub fn is_not_computed(&self) -> bool {
        matches!(self, Self::NotARecord(_) | Self::MissingPeriods)
    }
}

pub type Result<T> = std::result::Result<T, FinancialMetricsError>;
