//! Storage module for document blobs
//!
//! `BlobStore` is the seam the document flow depends on; `MinIOClient`
//! is the MinIO/S3-compatible implementation used in production.

mod blob_store;
mod minio_client;

pub use blob_store::BlobStore;
pub use minio_client::MinIOClient;
