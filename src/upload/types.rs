//! Upload types for intake.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Content type assumed for file parts that declare none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Limits applied to every upload request.
///
/// Built once at startup and shared read-only by all requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConstraint {
    /// Maximum size of a single file in bytes.
    pub max_file_bytes: u64,
    /// Maximum size of all files of one request in bytes.
    pub max_total_bytes: u64,
    /// Maximum number of files per request.
    pub max_file_count: usize,
    /// Accepted content type prefixes.
    pub allowed_content_types: Vec<String>,
    /// Multipart field name file parts must use.
    pub field_name: String,
}

/// One file part of an upload request.
///
/// `body` yields the file bytes as they arrive; its length is unknown until
/// it is exhausted.
#[derive(Debug)]
pub struct IncomingPart<S> {
    /// Multipart field name.
    pub field_name: String,
    /// File name declared by the client.
    pub original_name: String,
    /// Content type declared by the client.
    pub content_type: String,
    /// File content stream.
    pub body: S,
}

impl<S> IncomingPart<S> {
    /// Create a new incoming part.
    pub fn new(
        field_name: impl Into<String>,
        original_name: impl Into<String>,
        content_type: impl Into<String>,
        body: S,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            original_name: original_name.into(),
            content_type: content_type.into(),
            body,
        }
    }
}

/// A file that was fully written to storage.
///
/// Serializes to the response shape `{filename, originalname, size, mimetype}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedFile {
    /// Unique name of the file in storage.
    #[serde(rename = "filename")]
    pub storage_name: String,
    /// File name declared by the client.
    #[serde(rename = "originalname")]
    pub original_name: String,
    /// Number of bytes written.
    pub size: u64,
    /// Content type declared by the client.
    #[serde(rename = "mimetype")]
    pub content_type: String,
}

/// Outcome of ingesting a single part.
pub type IngestionOutcome = Result<PersistedFile, super::UploadError>;

/// Aggregate byte allowance of one batch.
#[derive(Debug)]
pub struct ByteBudget {
    used: AtomicU64,
    limit: u64,
}

impl ByteBudget {
    /// Create a budget allowing `limit` bytes.
    pub fn new(limit: u64) -> Self {
        Self {
            used: AtomicU64::new(0),
            limit,
        }
    }

    /// Claim `bytes` from the budget.
    ///
    /// Returns `false` without claiming anything if the claim would exceed
    /// the limit.
    pub fn consume(&self, bytes: u64) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(bytes).filter(|total| *total <= self.limit)
            })
            .is_ok()
    }

    /// Bytes claimed so far.
    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    /// Maximum number of bytes.
    pub fn limit(&self) -> u64 {
        self.limit
    }
}
