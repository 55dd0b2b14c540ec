use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::documents::dtos::{
    DocumentStatusResponseDto, UploadDocumentDto, UploadDocumentResponseDto, UploadForm,
    UploadRejection, UploadedFile, MAX_FILE_SIZE,
};
use crate::features::documents::services::DocumentService;
use crate::shared::types::ErrorResponse;

/// Map a multipart read failure to a response.
///
/// Hitting the body limit once a `file` part has started means the file
/// itself overflowed, which is answered like any other oversized file.
fn multipart_error(e: MultipartError, file_started: bool) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        if file_started {
            AppError::BadRequest(UploadRejection::FileTooLarge.to_string())
        } else {
            AppError::PayloadTooLarge("Request body too large".to_string())
        }
    } else {
        debug!("Failed to read multipart data: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Read the multipart body into an `UploadForm`.
///
/// File bytes past `MAX_FILE_SIZE` are drained and counted but not kept.
async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();
    let mut file_started = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, file_started))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_started = true;
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let filename = field.file_name().map(|s| s.to_string());

                let mut data = Vec::new();
                let mut size_bytes = 0usize;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, true))?
                {
                    size_bytes += chunk.len();
                    if size_bytes <= MAX_FILE_SIZE {
                        data.extend_from_slice(&chunk);
                    } else if !data.is_empty() {
                        data = Vec::new();
                    }
                }

                // Browsers send an empty, unnamed part when no file was picked
                if size_bytes == 0 && filename.as_deref().unwrap_or("").is_empty() {
                    continue;
                }

                form.file = Some(UploadedFile {
                    filename: filename.unwrap_or_else(|| "unnamed".to_string()),
                    content_type,
                    size_bytes,
                    data,
                });
            }
            "userId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, file_started))?;
                form.user_id = Some(text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

/// Upload a document for verification
///
/// Accepts multipart/form-data with:
/// - `file`: JPEG, PNG or PDF, at most 10MB (required)
/// - `userId`: identifier of the submitting user (required)
#[utoipa::path(
    post,
    path = "/documents/upload",
    tag = "documents",
    request_body(
        content = UploadDocumentDto,
        content_type = "multipart/form-data",
        description = "Document file and owner identifier",
    ),
    responses(
        (status = 200, description = "Document stored, verification pending", body = UploadDocumentResponseDto),
        (status = 400, description = "Missing file or owner, file too large, or invalid file type", body = ErrorResponse),
        (status = 413, description = "Request body too large", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
pub async fn upload_document(
    State(service): State<Arc<DocumentService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadDocumentResponseDto>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let upload = read_upload_form(&mut multipart)
        .await?
        .validate()
        .map_err(|rejection| AppError::BadRequest(rejection.to_string()))?;

    let response = service.upload(upload).await?;

    Ok(Json(response))
}

/// Get the verification status of a document
///
/// Once the document is `verified` or `failed` the response carries a freshly
/// minted signed URL valid for one hour.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "documents",
    params(
        ("id" = String, Path, description = "Document ID (UUID)")
    ),
    responses(
        (status = 200, description = "Current status; `url` present once terminal", body = DocumentStatusResponseDto),
        (status = 400, description = "Invalid document ID", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Signed URL could not be generated", body = ErrorResponse)
    )
)]
pub async fn get_document_status(
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentStatusResponseDto>, AppError> {
    let document_id = Uuid::parse_str(&id)
        .map_err(|_| AppError::BadRequest("Invalid document ID".to_string()))?;

    let response = service.get_status(document_id).await?;

    Ok(Json(response))
}
