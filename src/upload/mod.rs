//! Multipart upload ingestion for intake.
//!
//! This module turns the file parts of an upload request into stored files:
//! - Declared content type validation
//! - Per-file and per-request size limits, enforced while streaming
//! - Collision-free storage names
//! - All-or-nothing batches (a rejected batch leaves no files behind)

mod batch;
mod error;
mod ingest;
mod namer;
mod storage;
mod types;
mod validator;

pub use batch::{Batch, BatchController, BatchResult, BatchState};
pub use error::{ErrorKind, UploadError};
pub use ingest::StreamIngestor;
pub use namer::StorageNamer;
pub use storage::{PendingFile, UploadStorage};
pub use types::{
    ByteBudget, FileConstraint, IncomingPart, IngestionOutcome, PersistedFile,
    DEFAULT_CONTENT_TYPE,
};
pub use validator::FileValidator;
