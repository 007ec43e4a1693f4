//! Upload storage for intake.
//!
//! Files live directly under the base directory:
//! ```text
//! {base_path}/
//! ├── files-1718000000000-0-3fa9c2.png
//! ├── files-1718000000000-1-07b1de.jpg
//! └── ...
//! ```
//!
//! Files are written through a [`PendingFile`], which removes its file
//! again unless [`PendingFile::commit`] succeeds.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::Result;

/// Local filesystem storage for uploaded files.
#[derive(Debug, Clone)]
pub struct UploadStorage {
    /// Base directory for uploaded files.
    base_path: PathBuf,
}

impl UploadStorage {
    /// Create a new UploadStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the full file path for a stored name.
    pub fn file_path(&self, stored_name: &str) -> PathBuf {
        self.base_path.join(stored_name)
    }

    /// Create a new file and return a write handle for it.
    ///
    /// Fails with `AlreadyExists` instead of overwriting an existing file.
    pub async fn create(&self, stored_name: &str) -> io::Result<PendingFile> {
        let path = self.file_path(stored_name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        Ok(PendingFile {
            file: Some(file),
            path,
            stored_name: stored_name.to_string(),
            armed: true,
        })
    }

    /// Delete a file from storage.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub async fn delete(&self, stored_name: &str) -> io::Result<bool> {
        match tokio::fs::remove_file(self.file_path(stored_name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Delete a file without yielding to the runtime (for `Drop` paths).
    pub fn delete_blocking(&self, stored_name: &str) -> io::Result<bool> {
        remove_if_present(&self.file_path(stored_name))
    }

    /// Check if a file exists in storage.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.file_path(stored_name).exists()
    }

    /// Get the size of a stored file.
    pub async fn file_size(&self, stored_name: &str) -> io::Result<u64> {
        let metadata = tokio::fs::metadata(self.file_path(stored_name)).await?;
        Ok(metadata.len())
    }
}

fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Write handle for a file that is not yet complete.
///
/// Dropping the handle without a successful [`commit`](Self::commit)
/// deletes the file, including when the owning future is cancelled.
#[derive(Debug)]
pub struct PendingFile {
    file: Option<File>,
    path: PathBuf,
    stored_name: String,
    armed: bool,
}

impl PendingFile {
    /// Name of the file in storage.
    pub fn stored_name(&self) -> &str {
        &self.stored_name
    }

    /// Append bytes to the file.
    pub async fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(data).await,
            None => Err(io::Error::other("write handle already closed")),
        }
    }

    /// Flush the file to disk and keep it.
    pub async fn commit(mut self) -> io::Result<String> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }
        self.armed = false;
        Ok(std::mem::take(&mut self.stored_name))
    }

    /// Stop writing and delete the partial file.
    ///
    /// A failed delete is logged; the file is then left behind.
    pub async fn abort(mut self) {
        self.armed = false;
        drop(self.file.take());

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    stored_name = %self.stored_name,
                    error = %e,
                    "Failed to delete partial upload"
                );
            }
        }
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Close the handle before unlinking.
        drop(self.file.take());

        match remove_if_present(&self.path) {
            Ok(true) => {
                tracing::debug!(stored_name = %self.stored_name, "Discarded unfinished upload");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    stored_name = %self.stored_name,
                    error = %e,
                    "Failed to delete unfinished upload"
                );
            }
        }
    }
}
