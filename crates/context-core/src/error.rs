use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    /// The provider could not be reached, answered with a non-success status,
    /// or is not configured.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
