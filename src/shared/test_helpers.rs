//! In-memory stand-ins for the blob store and record store, with switches
//! to make individual operations fail.

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::SIGNED_URL_TTL_SECS;
use crate::features::documents::models::{Document, DocumentStatus, NewDocument};
use crate::features::documents::repositories::DocumentRepository;
use crate::features::documents::{routes, DocumentService};
use crate::modules::storage::BlobStore;

#[derive(Default)]
pub struct InMemoryBlobStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    fail_signing: AtomicBool,
    deletes: AtomicUsize,
    minted: AtomicUsize,
}

impl InMemoryBlobStore {
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_signing(&self) {
        self.fail_signing.store(true, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects.lock().unwrap().contains_key(path)
    }

    pub fn content_type(&self, path: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, ct)| ct.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub fn signed_urls_minted(&self) -> usize {
        self.minted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn write(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("write to {} refused", path)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), (data, content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("delete of {} refused", path)));
        }
        self.objects.lock().unwrap().remove(path);
        Ok(())
    }

    async fn mint_signed_url(&self, path: &str, ttl_secs: u32) -> Result<String> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("signing {} refused", path)));
        }
        let n = self.minted.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://blobs.test/{}?expires={}&sig={}",
            path, ttl_secs, n
        ))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.contains(path))
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<HashMap<Uuid, Document>>,
    fail_inserts: AtomicBool,
    required_blobs: Mutex<Option<Arc<InMemoryBlobStore>>>,
}

impl InMemoryDocumentRepository {
    pub fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    /// Refuse inserts whose blob is not already present in `blobs`.
    pub fn require_blobs_from(&self, blobs: Arc<InMemoryBlobStore>) {
        *self.required_blobs.lock().unwrap() = Some(blobs);
    }

    pub fn get(&self, id: Uuid) -> Option<Document> {
        self.documents.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn insert(&self, document: NewDocument) -> Result<Document> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let blobs = self.required_blobs.lock().unwrap().clone();
        if let Some(blobs) = blobs {
            if !blobs.contains(&document.storage_path) {
                return Err(AppError::Internal(format!(
                    "record for {} inserted before its blob",
                    document.storage_path
                )));
            }
        }

        let now = Utc::now();
        let record = Document {
            id: document.id,
            owner_id: document.owner_id,
            filename: document.filename,
            mime_type: document.mime_type,
            size_bytes: document.size_bytes,
            storage_path: document.storage_path,
            checksum_sha256: document.checksum_sha256,
            status: DocumentStatus::Processing,
            created_at: now,
            updated_at: now,
        };
        self.documents
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.get(id))
    }

    async fn update_status(&self, id: Uuid, status: DocumentStatus) -> Result<Document> {
        let mut documents = self.documents.lock().unwrap();
        let document = documents
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        if !document.status.can_transition_to(status) {
            return Err(AppError::Conflict(format!(
                "Document {} is already {}",
                id, document.status
            )));
        }

        document.status = status;
        document.updated_at = Utc::now();
        Ok(document.clone())
    }
}

/// Stores plus a router wired to them.
pub struct TestDocumentsApp {
    pub repository: Arc<InMemoryDocumentRepository>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub router: Router,
}

pub fn documents_app() -> TestDocumentsApp {
    documents_app_with_body_limit(32 * 1024 * 1024)
}

pub fn documents_app_with_body_limit(max_request_body_size: usize) -> TestDocumentsApp {
    let repository = Arc::new(InMemoryDocumentRepository::default());
    let blobs = Arc::new(InMemoryBlobStore::default());
    repository.require_blobs_from(blobs.clone());

    let service = Arc::new(DocumentService::new(
        repository.clone(),
        blobs.clone(),
        SIGNED_URL_TTL_SECS,
    ));

    TestDocumentsApp {
        repository,
        blobs,
        router: routes(service, max_request_body_size),
    }
}
