use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::documents::models::DocumentStatus;
use crate::shared::validation::OWNER_ID_REGEX;

/// Allowed MIME types for document uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "application/pdf"];

/// Maximum file size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default lifetime of URLs returned for documents in a terminal state (1 hour).
/// Overridden by `MINIO_PRESIGNED_URL_EXPIRY_SECS`.
pub const SIGNED_URL_TTL_SECS: u32 = 3600;

/// Check if a MIME type is allowed
pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}

/// Get file extension from content type
pub fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "application/pdf" => Some("pdf"),
        _ => None,
    }
}

/// Upload form for OpenAPI documentation only; the handler reads multipart directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    /// The document to upload (JPEG, PNG or PDF, at most 10MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Identifier of the submitting user
    #[schema(example = "user_2abcXYZ")]
    #[allow(non_snake_case)]
    pub userId: String,
}

/// Response for a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentResponseDto {
    pub document_id: Uuid,
    pub status: DocumentStatus,
}

/// Response for a status lookup. `url` is present iff the status is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatusResponseDto {
    pub document_id: Uuid,
    pub status: DocumentStatus,
    /// Time-limited signed URL to the stored file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// File part of an upload as read from the multipart body.
///
/// `data` holds the bytes only while the file is within `MAX_FILE_SIZE`;
/// `size_bytes` keeps counting past the ceiling so the rejection can be exact.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: usize,
    pub data: Vec<u8>,
}

/// Raw upload request, before validation
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub user_id: Option<String>,
}

/// Upload request that passed every check
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub owner_id: String,
    pub filename: String,
    pub content_type: String,
    pub extension: &'static str,
    pub data: Vec<u8>,
}

/// Why an upload request was refused. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("No file provided")]
    NoFile,
    #[error("Owner required")]
    OwnerRequired,
    #[error("Invalid owner ID")]
    InvalidOwner,
    #[error("File too large")]
    FileTooLarge,
    #[error("Invalid file type")]
    InvalidFileType,
}

impl UploadForm {
    pub fn validate(self) -> Result<ValidatedUpload, UploadRejection> {
        let file = self.file.ok_or(UploadRejection::NoFile)?;

        let owner_id = self
            .user_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(UploadRejection::OwnerRequired)?;

        if !OWNER_ID_REGEX.is_match(&owner_id) {
            return Err(UploadRejection::InvalidOwner);
        }

        if file.size_bytes > MAX_FILE_SIZE {
            return Err(UploadRejection::FileTooLarge);
        }

        let extension = get_extension_from_content_type(&file.content_type)
            .filter(|_| is_mime_type_allowed(&file.content_type))
            .ok_or(UploadRejection::InvalidFileType)?;

        Ok(ValidatedUpload {
            owner_id,
            filename: file.filename,
            content_type: file.content_type,
            extension,
            data: file.data,
        })
    }
}

/// Client-side checks mirroring the server's ceiling and allow-list.
/// An empty result means the file may be submitted.
pub fn candidate_errors(content_type: &str, size_bytes: usize) -> Vec<String> {
    let mut errors = Vec::new();

    if size_bytes > MAX_FILE_SIZE {
        errors.push(format!(
            "File too large. Maximum size is {} MB",
            MAX_FILE_SIZE / 1024 / 1024
        ));
    }

    if !is_mime_type_allowed(content_type) {
        errors.push(format!(
            "Invalid file type '{}'. Allowed types: {}",
            content_type,
            ALLOWED_MIME_TYPES.join(", ")
        ));
    }

    errors
}
