use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::documents::handlers::{get_document_status, upload_document};
use crate::features::documents::services::DocumentService;

/// Create routes for the documents feature
///
/// `max_request_body_size` bounds the whole multipart body; the per-file
/// ceiling is enforced by the handler so it can answer with a 400.
pub fn routes(document_service: Arc<DocumentService>, max_request_body_size: usize) -> Router {
    Router::new()
        .route(
            "/documents/upload",
            post(upload_document).layer(DefaultBodyLimit::max(max_request_body_size)),
        )
        .route("/documents/{id}", get(get_document_status))
        .with_state(document_service)
}
