//! Upload handler for Web API.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use futures::TryStreamExt;
use std::sync::Arc;

use crate::upload::{BatchResult, IncomingPart, UploadError, DEFAULT_CONTENT_TYPE};
use crate::web::handlers::AppState;

/// Classify a multipart parsing failure.
///
/// Hitting the request body limit counts as exceeding the aggregate cap.
fn multipart_error(err: MultipartError, max_total_bytes: u64) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TotalTooLarge {
            limit: max_total_bytes,
        }
    } else {
        UploadError::Malformed(err.body_text())
    }
}

/// POST /upload - Store a batch of files.
///
/// Request body: multipart/form-data with one or more file parts under the
/// configured field name (`files` by default). Other form fields are ignored.
/// A request that is not multipart at all is treated as carrying no files.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> BatchResult {
    let uploads = &state.uploads;
    let max_total_bytes = uploads.constraint().max_total_bytes;
    let mut batch = uploads.begin();

    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!("Upload request is not multipart: {}", rejection);
            return batch.finish().await;
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                batch.reject(multipart_error(e, max_total_bytes));
                break;
            }
        };

        // Plain form fields have no file name; browsers send an empty one
        // for a file input left blank.
        let original_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => continue,
        };
        let field_name = field.name().unwrap_or_default().to_owned();
        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_owned();
        let body = field.map_err(move |e| multipart_error(e, max_total_bytes));

        let part = IncomingPart::new(field_name, original_name, content_type, body);
        if batch.ingest(part).await.is_break() {
            break;
        }
    }

    batch.finish().await
}
