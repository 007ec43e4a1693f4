//! Web API module for intake.
//!
//! This module exposes the upload pipeline over HTTP: `POST /upload`, a
//! health check, and optional static file serving for the client UI.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
