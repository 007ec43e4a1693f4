//! Router configuration for Web API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::{upload_files, AppState};
use crate::upload::FileConstraint;

/// Allowance for multipart boundaries, part headers and form fields.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Maximum request body size accepted on the upload route.
pub fn upload_body_limit(constraint: &FileConstraint) -> usize {
    let limit = constraint
        .max_total_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    usize::try_from(limit).unwrap_or(usize::MAX)
}

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let body_limit = upload_body_limit(app_state.uploads.constraint());

    let upload_routes = Router::new().route(
        "/upload",
        post(upload_files).layer(DefaultBodyLimit::max(body_limit)),
    );

    Router::new()
        .merge(upload_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create a router serving static files for every unmatched path.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    if !Path::new(static_path).is_dir() {
        tracing::warn!(
            "Static directory {} not found, static file serving disabled",
            static_path
        );
        return None;
    }

    Some(Router::new().fallback_service(ServeDir::new(static_path)))
}
