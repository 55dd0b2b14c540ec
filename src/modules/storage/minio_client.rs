//! MinIO/S3-compatible storage client
//!
//! Stores document blobs in a private bucket and issues presigned GET URLs
//! for read access. Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::BlobStore;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    key_prefix: String,
}

impl MinIOClient {
    /// Create a new MinIO client from configuration
    pub fn new(config: MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, key_prefix: {}",
            config.endpoint,
            bucket.name(),
            config.key_prefix
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            key_prefix: config.key_prefix,
        })
    }

    /// Ensure the bucket exists, create if not
    ///
    /// Documents are never served anonymously, so no bucket policy is set:
    /// every read goes through a presigned URL.
    pub async fn ensure_bucket_exists(&self) -> Result<()> {
        let name = self.bucket.name();

        match Bucket::create_with_path_style(
            &name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::private(),
        )
        .await
        {
            Ok(response) if response.success() => {
                info!("Bucket '{}' created successfully", name);
                Ok(())
            }
            // 409: BucketAlreadyOwnedByYou / BucketAlreadyExists
            Ok(response) if response.response_code == 409 => {
                debug!("Bucket '{}' already exists", name);
                Ok(())
            }
            Ok(response) => {
                warn!(
                    "Could not create bucket '{}': {} {}. Assuming it exists.",
                    name, response.response_code, response.response_text
                );
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                {
                    debug!("Bucket '{}' already exists", name);
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to create bucket '{}' at {}: {}",
                        name, self.endpoint, e
                    )))
                }
            }
        }
    }

    /// Full object key for a document path: `{key_prefix}/{path}`
    pub fn object_key(&self, path: &str) -> String {
        if self.key_prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.key_prefix, path)
        }
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

fn is_success(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

#[async_trait]
impl BlobStore for MinIOClient {
    async fn write(&self, path: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let key = self.object_key(path);
        let response = self
            .bucket
            .put_object_with_content_type(&key, &data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload '{}': {}", key, e)))?;

        if !is_success(response.status_code()) {
            return Err(AppError::Storage(format!(
                "Failed to upload '{}': status {}",
                key,
                response.status_code()
            )));
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            data.len(),
            self.bucket.name()
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let key = self.object_key(path);
        let response = self
            .bucket
            .delete_object(&key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete '{}': {}", key, e)))?;

        // S3 answers 204 for deletes, including deletes of missing keys
        if !is_success(response.status_code()) && response.status_code() != 404 {
            return Err(AppError::Storage(format!(
                "Failed to delete '{}': status {}",
                key,
                response.status_code()
            )));
        }

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn mint_signed_url(&self, path: &str, ttl_secs: u32) -> Result<String> {
        let key = self.object_key(path);
        self.bucket
            .presign_get(&key, ttl_secs, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate presigned URL for '{}': {}",
                    key, e
                ))
            })
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let key = self.object_key(path);
        match self.bucket.head_object(&key).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, code)) if is_success(code) => Ok(true),
            Ok((_, code)) => Err(AppError::Storage(format!(
                "Failed to check if '{}' exists: status {}",
                key, code
            ))),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to check if '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }
}
