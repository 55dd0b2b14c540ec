use async_trait::async_trait;

use crate::core::error::Result;

/// Object storage seam used by the document flow.
///
/// Paths are relative (`{owner_id}/{document_id}.{ext}`); implementations
/// decide where that lands physically. Every method is fallible and bounded
/// by the implementation's own client timeouts.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path`, replacing anything already there.
    async fn write(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Remove the object at `path`. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Mint a time-limited read URL for the object at `path`.
    async fn mint_signed_url(&self, path: &str, ttl_secs: u32) -> Result<String>;

    /// Whether an object exists at `path`.
    async fn exists(&self, path: &str) -> Result<bool>;
}
