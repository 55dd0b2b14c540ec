use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::{
    DocumentStatusResponseDto, UploadDocumentResponseDto, ValidatedUpload,
};
use crate::features::documents::models::NewDocument;
use crate::features::documents::repositories::DocumentRepository;
use crate::modules::storage::BlobStore;

/// Service for document upload and status lookup
pub struct DocumentService {
    repository: Arc<dyn DocumentRepository>,
    blob_store: Arc<dyn BlobStore>,
    signed_url_ttl_secs: u32,
}

impl DocumentService {
    pub fn new(
        repository: Arc<dyn DocumentRepository>,
        blob_store: Arc<dyn BlobStore>,
        signed_url_ttl_secs: u32,
    ) -> Self {
        Self {
            repository,
            blob_store,
            signed_url_ttl_secs,
        }
    }

    /// Storage path for a document: `{owner_id}/{document_id}.{extension}`
    pub fn storage_path(owner_id: &str, document_id: Uuid, extension: &str) -> String {
        format!("{}/{}.{}", owner_id, document_id, extension)
    }

    /// Persist the blob, then the record.
    ///
    /// A failed blob write aborts before any record exists. A failed insert
    /// triggers a compensating delete of the blob; if that delete fails too
    /// the orphaned path is logged and the insert error is still returned.
    pub async fn upload(&self, upload: ValidatedUpload) -> Result<UploadDocumentResponseDto> {
        let document_id = Uuid::new_v4();
        let storage_path = Self::storage_path(&upload.owner_id, document_id, upload.extension);
        let size_bytes = upload.data.len() as i64;
        let checksum_sha256 = hex::encode(Sha256::digest(&upload.data));

        self.blob_store
            .write(&storage_path, upload.data, &upload.content_type)
            .await?;

        debug!("Document blob stored at {}", storage_path);

        let new_document = NewDocument {
            id: document_id,
            owner_id: upload.owner_id,
            filename: upload.filename,
            mime_type: upload.content_type,
            size_bytes,
            storage_path: storage_path.clone(),
            checksum_sha256,
        };

        let document = match self.repository.insert(new_document).await {
            Ok(document) => document,
            Err(insert_err) => {
                self.discard_blob(&storage_path).await;
                return Err(insert_err);
            }
        };

        info!(
            "Document uploaded: id={}, owner={}, mime={}, size={}",
            document.id, document.owner_id, document.mime_type, document.size_bytes
        );

        Ok(UploadDocumentResponseDto {
            document_id: document.id,
            status: document.status,
        })
    }

    async fn discard_blob(&self, storage_path: &str) {
        match self.blob_store.delete(storage_path).await {
            Ok(()) => debug!(
                "Removed blob {} after failed record insert",
                storage_path
            ),
            Err(e) => error!(
                storage_path = %storage_path,
                "Orphaned document blob: compensating delete failed: {}",
                e
            ),
        }
    }

    /// Current status of a document, with a fresh signed URL once terminal.
    pub async fn get_status(&self, document_id: Uuid) -> Result<DocumentStatusResponseDto> {
        let document = self
            .repository
            .get_by_id(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        let url = if document.status.is_terminal() {
            Some(
                self.blob_store
                    .mint_signed_url(&document.storage_path, self.signed_url_ttl_secs)
                    .await?,
            )
        } else {
            None
        };

        Ok(DocumentStatusResponseDto {
            document_id: document.id,
            status: document.status,
            url,
        })
    }
}
