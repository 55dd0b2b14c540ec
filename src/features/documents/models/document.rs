use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Document verification status matching the `document_status` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Processing,
    Verified,
    Failed,
}

impl DocumentStatus {
    /// `verified` and `failed` are final.
    pub fn is_terminal(self) -> bool {
        !matches!(self, DocumentStatus::Processing)
    }

    /// Only `processing -> verified|failed` is a legal transition.
    pub fn can_transition_to(self, next: DocumentStatus) -> bool {
        self == DocumentStatus::Processing && next.is_terminal()
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Processing => write!(f, "processing"),
            DocumentStatus::Verified => write!(f, "verified"),
            DocumentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Database model for an uploaded document
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub owner_id: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub checksum_sha256: String,
    pub status: DocumentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new document record. Status is always `processing`.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub owner_id: String,
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub checksum_sha256: String,
}
