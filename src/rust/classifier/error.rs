use ort::Error as OrtError;
use thiserror::Error;

/// Errors raised while turning one submitted record into a risk assessment.
///
/// Every variant is request-level: the request fails as a whole and no
/// partial result is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A field required by the request schema or the column list was not supplied
    #[error("Missing field: {0}")]
    MissingField(String),
    /// A numeric field could not be coerced to its declared type
    #[error("Invalid value for '{field}': expected {expected}, got {value:?}")]
    InvalidNumber {
        field: String,
        expected: &'static str,
        value: String,
    },
    /// A record value does not fit the column it feeds
    #[error("Schema mismatch: {0}")]
    Schema(String),
    /// The classifier produced an output the pipeline cannot interpret
    #[error("Prediction error: {0}")]
    Prediction(String),
    /// The underlying model runtime failed
    #[error("Model error: {0}")]
    Model(String),
}

impl PipelineError {
    /// True for errors caused by the submitted input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidNumber { .. })
    }
}

impl From<OrtError> for PipelineError {
    fn from(err: OrtError) -> Self {
        PipelineError::Model(err.to_string())
    }
}
