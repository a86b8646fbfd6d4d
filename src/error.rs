use k_nn::KnnError;
use thiserror::Error;

/// Failure to load the reference dataset. Fatal at startup.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset header is missing")]
    MissingHeader,
    #[error("malformed dataset header: {0}")]
    InvalidHeader(String),
    #[error("record {record}: {reason}")]
    InvalidRecord { record: usize, reason: String },
    #[error("header declares {expected} samples but {found} were read")]
    SampleCountMismatch { expected: usize, found: usize },
    #[error("dataset contains no samples")]
    Empty,
}

/// Failure of a single prediction call.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Missing, non-numeric or out-of-range input. No computation was attempted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("classifier failed: {0}")]
    Knn(#[from] KnnError),
    #[error("predicted label {0} has no species name")]
    UnknownLabel(usize),
}

impl PredictError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PredictError::InvalidInput(msg.into())
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PredictError::InvalidInput(_))
    }
}
