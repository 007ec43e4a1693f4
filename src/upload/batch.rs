//! Batch orchestration for upload requests.
//!
//! A [`Batch`] moves through `Idle → Receiving → {Accepted, Rejected}`.
//! The first failure rejects the whole batch: no further parts are
//! ingested and every file already stored for the batch is deleted.

use std::ops::ControlFlow;

use axum::body::Bytes;
use futures::Stream;

use super::{
    ByteBudget, FileConstraint, IncomingPart, PersistedFile, StreamIngestor, UploadError,
    UploadStorage,
};

/// Observable state of a batch that has not been finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// No file part received yet.
    Idle,
    /// At least one part received, no failure so far.
    Receiving,
    /// A failure occurred; remaining parts are ignored.
    Rejected,
}

/// Final verdict of a batch.
#[derive(Debug)]
pub enum BatchResult {
    /// Every part was stored; files in arrival order.
    Accepted(Vec<PersistedFile>),
    /// The batch failed; carries the first failure.
    Rejected(UploadError),
}

impl BatchResult {
    /// Check whether the batch was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, BatchResult::Accepted(_))
    }

    /// Stored files, if accepted.
    pub fn files(&self) -> Option<&[PersistedFile]> {
        match self {
            BatchResult::Accepted(files) => Some(files),
            BatchResult::Rejected(_) => None,
        }
    }

    /// Failure, if rejected.
    pub fn error(&self) -> Option<&UploadError> {
        match self {
            BatchResult::Accepted(_) => None,
            BatchResult::Rejected(error) => Some(error),
        }
    }

    /// Convert into a plain `Result`.
    pub fn into_result(self) -> Result<Vec<PersistedFile>, UploadError> {
        match self {
            BatchResult::Accepted(files) => Ok(files),
            BatchResult::Rejected(error) => Err(error),
        }
    }
}

/// Applies a [`FileConstraint`] to whole upload requests.
#[derive(Debug)]
pub struct BatchController {
    constraint: FileConstraint,
    ingestor: StreamIngestor,
}

impl BatchController {
    /// Create a controller writing to `storage`.
    pub fn new(constraint: FileConstraint, storage: UploadStorage) -> Self {
        let ingestor = StreamIngestor::new(&constraint, storage);
        Self {
            constraint,
            ingestor,
        }
    }

    /// Get the constraint applied to every batch.
    pub fn constraint(&self) -> &FileConstraint {
        &self.constraint
    }

    /// Get the storage files are written to.
    pub fn storage(&self) -> &UploadStorage {
        self.ingestor.storage()
    }

    /// Start a new batch.
    pub fn begin(&self) -> Batch<'_> {
        Batch {
            controller: self,
            budget: ByteBudget::new(self.constraint.max_total_bytes),
            received: 0,
            persisted: Vec::new(),
            failure: None,
        }
    }

    /// Run a complete batch over `parts`.
    ///
    /// If the iterator reports more parts than allowed up front, the batch
    /// is rejected before any part is read.
    pub async fn handle_batch<I, S>(&self, parts: I) -> BatchResult
    where
        I: IntoIterator<Item = IncomingPart<S>>,
        S: Stream<Item = Result<Bytes, UploadError>>,
    {
        let parts = parts.into_iter();
        let mut batch = self.begin();

        if parts.size_hint().0 > self.constraint.max_file_count {
            batch.reject(UploadError::TooManyFiles {
                limit: self.constraint.max_file_count,
            });
            return batch.finish().await;
        }

        for part in parts {
            if batch.ingest(part).await.is_break() {
                break;
            }
        }
        batch.finish().await
    }
}

/// One upload request in progress.
///
/// Dropping an unfinished batch (for example when the client disconnects)
/// deletes every file it stored.
#[derive(Debug)]
pub struct Batch<'a> {
    controller: &'a BatchController,
    budget: ByteBudget,
    received: usize,
    persisted: Vec<PersistedFile>,
    failure: Option<UploadError>,
}

impl Batch<'_> {
    /// Current state.
    pub fn state(&self) -> BatchState {
        if self.failure.is_some() {
            BatchState::Rejected
        } else if self.received == 0 {
            BatchState::Idle
        } else {
            BatchState::Receiving
        }
    }

    /// Files stored so far.
    pub fn files(&self) -> &[PersistedFile] {
        &self.persisted
    }

    /// Bytes accepted so far.
    pub fn total_bytes(&self) -> u64 {
        self.budget.used()
    }

    /// Ingest the next file part.
    ///
    /// Returns `Break` once the batch is rejected; the caller should stop
    /// feeding parts and call [`finish`](Self::finish).
    pub async fn ingest<S>(&mut self, part: IncomingPart<S>) -> ControlFlow<()>
    where
        S: Stream<Item = Result<Bytes, UploadError>>,
    {
        if self.failure.is_some() {
            return ControlFlow::Break(());
        }

        let constraint = &self.controller.constraint;
        if part.field_name != constraint.field_name {
            self.reject(UploadError::UnexpectedField(part.field_name));
            return ControlFlow::Break(());
        }
        if self.received >= constraint.max_file_count {
            self.reject(UploadError::TooManyFiles {
                limit: constraint.max_file_count,
            });
            return ControlFlow::Break(());
        }
        self.received += 1;

        match self.controller.ingestor.ingest(part, &self.budget).await {
            Ok(file) => {
                self.persisted.push(file);
                ControlFlow::Continue(())
            }
            Err(e) => {
                self.reject(e);
                ControlFlow::Break(())
            }
        }
    }

    /// Reject the batch with a failure detected outside the ingestor.
    ///
    /// Only the first failure is kept.
    pub fn reject(&mut self, error: UploadError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    /// Decide the verdict, deleting stored files if rejected.
    pub async fn finish(mut self) -> BatchResult {
        if let Some(error) = self.failure.take() {
            let discarded = self.persisted.len();
            self.discard().await;
            tracing::info!(
                kind = ?error.kind(),
                received = self.received,
                discarded,
                "Upload batch rejected"
            );
            return BatchResult::Rejected(error);
        }

        if self.persisted.is_empty() {
            return BatchResult::Rejected(UploadError::NoFilesProvided);
        }

        let files = std::mem::take(&mut self.persisted);
        tracing::info!(
            count = files.len(),
            total_bytes = self.budget.used(),
            "Upload batch accepted"
        );
        BatchResult::Accepted(files)
    }

    /// Delete every stored file of this batch.
    async fn discard(&mut self) {
        let storage = self.controller.storage();

        // Pop only after the delete so a cancelled discard leaves the rest to `Drop`.
        while let Some(file) = self.persisted.last() {
            if let Err(e) = storage.delete(&file.storage_name).await {
                tracing::warn!(
                    storage_name = %file.storage_name,
                    error = %e,
                    "Failed to delete file of rejected upload"
                );
            }
            self.persisted.pop();
        }
    }
}

impl Drop for Batch<'_> {
    fn drop(&mut self) {
        if self.persisted.is_empty() {
            return;
        }

        let storage = self.controller.storage();
        tracing::warn!(
            count = self.persisted.len(),
            "Upload batch abandoned, deleting stored files"
        );
        for file in self.persisted.drain(..) {
            if let Err(e) = storage.delete_blocking(&file.storage_name) {
                tracing::warn!(
                    storage_name = %file.storage_name,
                    error = %e,
                    "Failed to delete file of abandoned upload"
                );
            }
        }
    }
}
