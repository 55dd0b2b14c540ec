//! Scripted `DocumentApi` and capturing `NotificationSink` for client tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

use super::api::{CandidateFile, ClientError, DocumentApi};
use super::notifier::NotificationSink;
use crate::features::documents::dtos::{DocumentStatusResponseDto, UploadDocumentResponseDto};
use crate::features::documents::models::DocumentStatus;

/// One scripted answer of the status endpoint
#[derive(Debug, Clone)]
pub enum Step {
    Status(DocumentStatus),
    Error,
}

pub fn processing(n: usize) -> Vec<Step> {
    vec![Step::Status(DocumentStatus::Processing); n]
}

#[derive(Default)]
pub struct ScriptedApi {
    scripts: Mutex<HashMap<String, Vec<Step>>>,
    failing_uploads: Mutex<HashSet<String>>,
    documents: Mutex<HashMap<Uuid, (String, usize)>>,
    uploads: Mutex<Vec<String>>,
}

impl ScriptedApi {
    /// Status answers for the document uploaded from `filename`; the last
    /// step repeats once the script is exhausted.
    pub fn script(&self, filename: &str, steps: Vec<Step>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(filename.to_string(), steps);
    }

    pub fn fail_upload(&self, filename: &str) {
        self.failing_uploads
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    /// Filenames in the order their upload was attempted
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn document_id(&self, filename: &str) -> Option<Uuid> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|(_, (name, _))| name == filename)
            .map(|(id, _)| *id)
    }

    pub fn status_calls(&self, document_id: Uuid) -> usize {
        self.documents
            .lock()
            .unwrap()
            .get(&document_id)
            .map(|(_, calls)| *calls)
            .unwrap_or(0)
    }

    pub fn total_status_calls(&self) -> usize {
        self.documents
            .lock()
            .unwrap()
            .values()
            .map(|(_, calls)| calls)
            .sum()
    }
}

#[async_trait]
impl DocumentApi for ScriptedApi {
    async fn upload(
        &self,
        file: &CandidateFile,
        _owner_id: &str,
    ) -> Result<UploadDocumentResponseDto, ClientError> {
        self.uploads.lock().unwrap().push(file.name.clone());

        if self.failing_uploads.lock().unwrap().contains(&file.name) {
            return Err(ClientError::Rejected {
                status: 500,
                message: "Document storage is unavailable".to_string(),
            });
        }

        let document_id = Uuid::new_v4();
        self.documents
            .lock()
            .unwrap()
            .insert(document_id, (file.name.clone(), 0));

        Ok(UploadDocumentResponseDto {
            document_id,
            status: DocumentStatus::Processing,
        })
    }

    async fn status(&self, document_id: Uuid) -> Result<DocumentStatusResponseDto, ClientError> {
        let (filename, call) = {
            let mut documents = self.documents.lock().unwrap();
            let (name, calls) = documents
                .get_mut(&document_id)
                .ok_or_else(|| ClientError::Rejected {
                    status: 404,
                    message: "Document not found".to_string(),
                })?;
            *calls += 1;
            (name.clone(), *calls - 1)
        };

        let step = {
            let scripts = self.scripts.lock().unwrap();
            let steps = scripts.get(&filename).cloned().unwrap_or_default();
            steps
                .get(call)
                .or(steps.last())
                .cloned()
                .unwrap_or(Step::Status(DocumentStatus::Processing))
        };

        match step {
            Step::Status(status) => Ok(DocumentStatusResponseDto {
                document_id,
                status,
                url: status
                    .is_terminal()
                    .then(|| format!("https://blobs.test/{}?sig={}", document_id, call)),
            }),
            Step::Error => Err(ClientError::Transport("connection reset".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Default)]
pub struct CapturingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl CapturingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn successes(&self) -> usize {
        self.notices()
            .iter()
            .filter(|n| matches!(n, Notice::Success(_)))
            .count()
    }

    pub fn errors(&self) -> usize {
        self.notices()
            .iter()
            .filter(|n| matches!(n, Notice::Error(_)))
            .count()
    }
}

impl NotificationSink for CapturingNotifier {
    fn success(&self, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Error(message.to_string()));
    }
}
