//! API handlers for intake.

pub mod upload;

pub use upload::*;

use crate::config::UploadConfig;
use crate::upload::{BatchController, FileConstraint, UploadStorage};
use crate::Result;

/// Application state shared by all requests.
///
/// Immutable after startup apart from the storage namer's counter.
#[derive(Debug)]
pub struct AppState {
    /// Upload batch controller.
    pub uploads: BatchController,
}

impl AppState {
    /// Create a new application state.
    pub fn new(constraint: FileConstraint, storage: UploadStorage) -> Self {
        Self {
            uploads: BatchController::new(constraint, storage),
        }
    }

    /// Create the state from upload configuration, creating the uploads directory.
    pub fn from_config(config: &UploadConfig) -> Result<Self> {
        let storage = UploadStorage::new(&config.dir)?;
        Ok(Self::new(config.constraint(), storage))
    }
}
