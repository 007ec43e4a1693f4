//! Streaming ingestion of a single file part.

use std::pin::pin;

use axum::body::Bytes;
use futures::{Stream, StreamExt};

use super::storage::PendingFile;
use super::{
    ByteBudget, FileConstraint, FileValidator, IncomingPart, IngestionOutcome, PersistedFile,
    StorageNamer, UploadError, UploadStorage,
};

/// Streams file parts into storage while enforcing type and size limits.
#[derive(Debug)]
pub struct StreamIngestor {
    validator: FileValidator,
    namer: StorageNamer,
    storage: UploadStorage,
    max_file_bytes: u64,
}

impl StreamIngestor {
    /// Create an ingestor for the given constraint and storage.
    pub fn new(constraint: &FileConstraint, storage: UploadStorage) -> Self {
        Self {
            validator: FileValidator::new(&constraint.allowed_content_types),
            namer: StorageNamer::new(),
            storage,
            max_file_bytes: constraint.max_file_bytes,
        }
    }

    /// Get the storage files are written to.
    pub fn storage(&self) -> &UploadStorage {
        &self.storage
    }

    /// Ingest one part.
    ///
    /// The body is not read at all if the declared type is rejected. Every
    /// chunk is charged against `budget`; when the part or the budget
    /// overflows, the partial file is deleted and an error is returned.
    pub async fn ingest<S>(&self, part: IncomingPart<S>, budget: &ByteBudget) -> IngestionOutcome
    where
        S: Stream<Item = Result<Bytes, UploadError>>,
    {
        let IncomingPart {
            field_name,
            original_name,
            content_type,
            body,
        } = part;

        self.validator.validate(&original_name, &content_type)?;

        let storage_name = self.namer.name(&field_name, &original_name);
        let mut pending = self.storage.create(&storage_name).await?;

        match self
            .copy_body(&mut pending, body, &original_name, budget)
            .await
        {
            Ok(size) => {
                let storage_name = pending.commit().await?;
                tracing::debug!(
                    storage_name = %storage_name,
                    original_name = %original_name,
                    size,
                    "Stored uploaded file"
                );
                Ok(PersistedFile {
                    storage_name,
                    original_name,
                    size,
                    content_type,
                })
            }
            Err(e) => {
                pending.abort().await;
                Err(e)
            }
        }
    }

    /// Copy the body into `pending`, returning the number of bytes written.
    async fn copy_body<S>(
        &self,
        pending: &mut PendingFile,
        body: S,
        original_name: &str,
        budget: &ByteBudget,
    ) -> Result<u64, UploadError>
    where
        S: Stream<Item = Result<Bytes, UploadError>>,
    {
        let mut body = pin!(body);
        let mut size: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            let len = chunk.len() as u64;

            size += len;
            if size > self.max_file_bytes {
                return Err(UploadError::FileTooLarge {
                    original_name: original_name.to_string(),
                    limit: self.max_file_bytes,
                });
            }
            if !budget.consume(len) {
                return Err(UploadError::TotalTooLarge {
                    limit: budget.limit(),
                });
            }

            pending.write(&chunk).await?;
        }

        Ok(size)
    }
}
