//! HTTP error reporting for intake.
//!
//! Upload verdicts are turned into responses here and nowhere else.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::upload::{BatchResult, UploadError};

/// Body sent when a request carries no files.
pub const NO_FILES_MESSAGE: &str = "No files were selected.";

/// Body sent for server-side failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type, rendered as a plain-text response.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message sent to the client.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status_code(), self.message).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match &err {
            UploadError::NoFilesProvided => {
                tracing::warn!("Upload rejected: {}", err);
                ApiError::bad_request(NO_FILES_MESSAGE)
            }
            _ if err.is_client_error() => {
                tracing::warn!(kind = ?err.kind(), "Upload rejected: {}", err);
                ApiError::bad_request(format!("File upload failed: {err}"))
            }
            _ => {
                tracing::error!(kind = ?err.kind(), "Upload failed: {}", err);
                ApiError::internal(INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for BatchResult {
    fn into_response(self) -> Response {
        match self {
            BatchResult::Accepted(files) => (StatusCode::OK, Json(files)).into_response(),
            BatchResult::Rejected(err) => ApiError::from(err).into_response(),
        }
    }
}
