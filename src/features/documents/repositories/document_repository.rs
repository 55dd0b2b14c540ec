use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::models::{Document, DocumentStatus, NewDocument};

const DOCUMENT_COLUMNS: &str = "id, owner_id, filename, mime_type, size_bytes, storage_path, \
     checksum_sha256, status, created_at, updated_at";

/// Record store for documents.
///
/// The upload flow only calls `insert` and `get_by_id`; `update_status`
/// belongs to the external verifier.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new record with status `processing`.
    async fn insert(&self, document: NewDocument) -> Result<Document>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Document>>;

    /// Move a `processing` document to a terminal status.
    ///
    /// Returns `NotFound` for an unknown id and `Conflict` for any other
    /// transition.
    async fn update_status(&self, id: Uuid, status: DocumentStatus) -> Result<Document>;
}

/// Postgres-backed document repository
pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<Document> {
        let query = format!(
            r#"
            INSERT INTO documents (id, owner_id, filename, mime_type, size_bytes, storage_path, checksum_sha256, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let document = sqlx::query_as::<_, Document>(&query)
            .bind(document.id)
            .bind(&document.owner_id)
            .bind(&document.filename)
            .bind(&document.mime_type)
            .bind(document.size_bytes)
            .bind(&document.storage_path)
            .bind(&document.checksum_sha256)
            .bind(DocumentStatus::Processing)
            .fetch_one(&self.pool)
            .await?;

        Ok(document)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        let query = format!("SELECT {} FROM documents WHERE id = $1", DOCUMENT_COLUMNS);

        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(document)
    }

    async fn update_status(&self, id: Uuid, status: DocumentStatus) -> Result<Document> {
        if !status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Document {} cannot be moved back to processing",
                id
            )));
        }

        // The status guard in the WHERE clause makes the transition a single
        // compare-and-set; the migration trigger rejects anything else too.
        let query = format!(
            r#"
            UPDATE documents
            SET status = $2
            WHERE id = $1 AND status = 'processing'
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let updated = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(document) => {
                info!("Document {} moved to {}", id, status);
                Ok(document)
            }
            None => match self.get_by_id(id).await? {
                Some(current) => Err(AppError::Conflict(format!(
                    "Document {} is already {}",
                    id, current.status
                ))),
                None => Err(AppError::NotFound("Document not found".to_string())),
            },
        }
    }
}
