//! Error types for intake.

use thiserror::Error;

/// Common error type for intake startup and configuration.
///
/// Failures of the upload pipeline itself are reported through
/// [`UploadError`](crate::upload::UploadError).
#[derive(Error, Debug)]
pub enum IntakeError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration was parsed but holds unusable values.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for intake operations.
pub type Result<T> = std::result::Result<T, IntakeError>;
