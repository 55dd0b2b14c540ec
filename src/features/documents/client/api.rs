use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::features::documents::dtos::{DocumentStatusResponseDto, UploadDocumentResponseDto};
use crate::shared::types::ErrorResponse;

/// A file picked by the user, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status and an `{error}` body.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Client side of the upload and status endpoints
#[async_trait]
pub trait DocumentApi: Send + Sync {
    async fn upload(
        &self,
        file: &CandidateFile,
        owner_id: &str,
    ) -> Result<UploadDocumentResponseDto, ClientError>;

    async fn status(&self, document_id: Uuid) -> Result<DocumentStatusResponseDto, ClientError>;
}

/// `DocumentApi` over HTTP
#[derive(Clone, Debug)]
pub struct HttpDocumentApi {
    client: Client,
    base_url: String,
}

impl HttpDocumentApi {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

#[async_trait]
impl DocumentApi for HttpDocumentApi {
    async fn upload(
        &self,
        file: &CandidateFile,
        owner_id: &str,
    ) -> Result<UploadDocumentResponseDto, ClientError> {
        let part = multipart::Part::bytes(file.data.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(transport)?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("userId", owner_id.to_string());

        let response = self
            .client
            .post(format!("{}/documents/upload", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;

        Self::decode(response).await
    }

    async fn status(&self, document_id: Uuid) -> Result<DocumentStatusResponseDto, ClientError> {
        let response = self
            .client
            .get(format!("{}/documents/{}", self.base_url, document_id))
            .send()
            .await
            .map_err(transport)?;

        Self::decode(response).await
    }
}
