//! Upload pipeline failures.

use thiserror::Error;

/// Failure category of an upload, independent of the detail message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Declared content type is not allowed.
    InvalidType,
    /// A single file exceeds the per-file cap.
    FileTooLarge,
    /// The files of the request exceed the aggregate cap.
    TotalTooLarge,
    /// The request carries more files than allowed.
    TooManyFiles,
    /// The request carries no file at all.
    NoFilesProvided,
    /// A file arrived under an unexpected field name.
    UnexpectedField,
    /// The multipart body could not be parsed.
    MalformedRequest,
    /// Writing or deleting a stored file failed.
    StorageIo,
    /// Anything unanticipated.
    Internal,
}

/// Upload error.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Declared content type is not allowed.
    #[error("file type {content_type} is not allowed for {original_name}")]
    InvalidType {
        /// Original file name.
        original_name: String,
        /// Declared content type.
        content_type: String,
    },

    /// A single file exceeds the per-file cap.
    #[error("{original_name} is larger than {limit} bytes")]
    FileTooLarge {
        /// Original file name.
        original_name: String,
        /// Per-file cap in bytes.
        limit: u64,
    },

    /// The files of the request exceed the aggregate cap.
    #[error("files are larger than {limit} bytes in total")]
    TotalTooLarge {
        /// Aggregate cap in bytes.
        limit: u64,
    },

    /// The request carries more files than allowed.
    #[error("too many files (max {limit})")]
    TooManyFiles {
        /// Maximum number of files.
        limit: usize,
    },

    /// The request carries no file at all.
    #[error("no files were selected")]
    NoFilesProvided,

    /// A file arrived under an unexpected field name.
    #[error("unexpected field {0}")]
    UnexpectedField(String),

    /// The multipart body could not be parsed.
    #[error("malformed multipart body: {0}")]
    Malformed(String),

    /// Writing or deleting a stored file failed.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Anything unanticipated.
    #[error("internal error: {0}")]
    Internal(String),
}

impl UploadError {
    /// Get the failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::InvalidType { .. } => ErrorKind::InvalidType,
            UploadError::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            UploadError::TotalTooLarge { .. } => ErrorKind::TotalTooLarge,
            UploadError::TooManyFiles { .. } => ErrorKind::TooManyFiles,
            UploadError::NoFilesProvided => ErrorKind::NoFilesProvided,
            UploadError::UnexpectedField(_) => ErrorKind::UnexpectedField,
            UploadError::Malformed(_) => ErrorKind::MalformedRequest,
            UploadError::Storage(_) => ErrorKind::StorageIo,
            UploadError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::StorageIo | ErrorKind::Internal)
    }
}
