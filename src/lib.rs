//! intake - batch image upload service
//!
//! Accepts multipart uploads over HTTP, validates and streams each file to
//! local storage, and answers with per-file metadata or a single error.

pub mod config;
pub mod error;
pub mod logging;
pub mod upload;
pub mod web;

pub use config::Config;
pub use error::{IntakeError, Result};
pub use upload::{
    BatchController, BatchResult, ErrorKind, FileConstraint, IncomingPart, PersistedFile,
    UploadError, UploadStorage,
};
pub use web::WebServer;
