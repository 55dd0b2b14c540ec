use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::api::{CandidateFile, DocumentApi};
use super::notifier::NotificationSink;
use super::poller::{poll_until_terminal, PollOutcome, PollPolicy};
use super::preview::{PreviewHandle, PreviewRegistry};
use crate::features::documents::dtos::candidate_errors;
use crate::features::documents::models::DocumentStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    Pending,
    Uploading,
    /// Upload request failed. Not a verification outcome.
    UploadFailed(String),
    Submitted(Uuid),
}

/// A queued candidate file
///
/// `progress` is all-or-nothing: 0 until the upload is acknowledged, 100
/// once it is. The upload is a single request with no partial reporting.
#[derive(Debug)]
pub struct FileEntry {
    file: CandidateFile,
    preview: PreviewHandle,
    errors: Vec<String>,
    state: EntryState,
    progress: u8,
    poll_token: Option<CancellationToken>,
}

impl FileEntry {
    pub fn file(&self) -> &CandidateFile {
        &self.file
    }

    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    /// Client-side validation errors; empty when the file can be submitted
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn document_id(&self) -> Option<Uuid> {
        match self.state {
            EntryState::Submitted(id) => Some(id),
            _ => None,
        }
    }

    fn is_submittable(&self) -> bool {
        self.errors.is_empty()
            && matches!(self.state, EntryState::Pending | EntryState::UploadFailed(_))
    }
}

#[derive(Debug, Default)]
struct Session {
    statuses: HashMap<Uuid, DocumentStatus>,
    notified: HashSet<Uuid>,
}

/// Headless upload widget: queues files, uploads them one at a time and
/// tracks each submitted document until its verification settles.
pub struct UploadWidget {
    api: Arc<dyn DocumentApi>,
    notifier: Arc<dyn NotificationSink>,
    previews: PreviewRegistry,
    owner_id: String,
    policy: PollPolicy,
    entries: Vec<FileEntry>,
    cancel: CancellationToken,
    polls: JoinSet<()>,
    session: Arc<Mutex<Session>>,
}

impl UploadWidget {
    pub fn new(
        api: Arc<dyn DocumentApi>,
        notifier: Arc<dyn NotificationSink>,
        previews: PreviewRegistry,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            notifier,
            previews,
            owner_id: owner_id.into(),
            policy: PollPolicy::default(),
            entries: Vec::new(),
            cancel: CancellationToken::new(),
            polls: JoinSet::new(),
            session: Arc::new(Mutex::new(Session::default())),
        }
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Queue files. Files failing validation stay in the queue with their
    /// errors and are skipped by `submit_all`.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = CandidateFile>) {
        for file in files {
            let errors = candidate_errors(&file.mime_type, file.size_bytes());
            if !errors.is_empty() {
                debug!("Queued {} with errors: {:?}", file.name, errors);
            }

            let preview = self.previews.acquire(&file);
            self.entries.push(FileEntry {
                file,
                preview,
                errors,
                state: EntryState::Pending,
                progress: 0,
                poll_token: None,
            });
        }
    }

    /// Remove an entry from the queue. Stops polling for it if it was
    /// submitted. Returns `None` for an unknown index or an entry in flight.
    pub fn remove(&mut self, index: usize) -> Option<CandidateFile> {
        if matches!(self.entries.get(index)?.state, EntryState::Uploading) {
            return None;
        }

        let entry = self.entries.remove(index);
        if let Some(token) = &entry.poll_token {
            token.cancel();
        }
        Some(entry.file)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Upload every submittable entry in queue order. A failed upload is
    /// reported and does not stop the remaining entries.
    pub async fn submit_all(&mut self) {
        self.reap_finished_polls();

        for index in 0..self.entries.len() {
            if self.cancel.is_cancelled() {
                return;
            }
            if !self.entries[index].is_submittable() {
                continue;
            }

            let entry = &mut self.entries[index];
            entry.state = EntryState::Uploading;
            entry.progress = 0;

            match self.api.upload(&entry.file, &self.owner_id).await {
                Ok(ack) => {
                    info!("Uploaded {} as document {}", entry.file.name, ack.document_id);
                    entry.state = EntryState::Submitted(ack.document_id);
                    entry.progress = 100;

                    let filename = entry.file.name.clone();
                    let token = self.cancel.child_token();
                    entry.poll_token = Some(token.clone());

                    self.lock_session()
                        .statuses
                        .insert(ack.document_id, ack.status);
                    self.start_polling(ack.document_id, filename, token);
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", entry.file.name, e);
                    self.notifier
                        .error(&format!("Upload of {} failed: {}", entry.file.name, e));
                    entry.state = EntryState::UploadFailed(e.to_string());
                    entry.progress = 0;
                }
            }
        }
    }

    fn start_polling(&mut self, document_id: Uuid, filename: String, token: CancellationToken) {
        let api = self.api.clone();
        let notifier = self.notifier.clone();
        let session = self.session.clone();
        let policy = self.policy;

        self.polls.spawn(async move {
            let outcome = poll_until_terminal(api.as_ref(), document_id, policy, &token).await;

            // Cancellation is checked under the session lock so that
            // nothing is applied once `unmount` has returned
            let mut session = session.lock().unwrap_or_else(|p| p.into_inner());
            if token.is_cancelled() {
                return;
            }

            match outcome {
                PollOutcome::Terminal(snapshot) => {
                    session.statuses.insert(document_id, snapshot.status);
                    if !session.notified.insert(document_id) {
                        return;
                    }
                    match snapshot.status {
                        DocumentStatus::Verified => {
                            notifier.success(&format!("{} verified", filename))
                        }
                        DocumentStatus::Failed => {
                            notifier.error(&format!("{} failed verification", filename))
                        }
                        DocumentStatus::Processing => {}
                    }
                }
                PollOutcome::GaveUp { last_error } => {
                    if session.notified.insert(document_id) {
                        notifier.error(&format!(
                            "Could not confirm status of {}: {}",
                            filename, last_error
                        ));
                    }
                }
                PollOutcome::Cancelled => {}
            }
        });
    }

    /// Drop poll tasks that have already completed.
    fn reap_finished_polls(&mut self) {
        while let Some(result) = self.polls.try_join_next() {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    warn!("Status poll task failed: {}", e);
                }
            }
        }
    }

    /// Number of poll tasks not yet reaped
    pub fn active_polls(&self) -> usize {
        self.polls.len()
    }

    /// Last observed status per submitted document
    pub fn statuses(&self) -> HashMap<Uuid, DocumentStatus> {
        self.lock_session().statuses.clone()
    }

    pub fn status_of(&self, document_id: Uuid) -> Option<DocumentStatus> {
        self.lock_session().statuses.get(&document_id).copied()
    }

    /// Wait until every poll task has finished.
    pub async fn settle(&mut self) {
        while let Some(result) = self.polls.join_next().await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    warn!("Status poll task failed: {}", e);
                }
            }
        }
    }

    /// Stop all polling for this session. No status calls, state updates or
    /// notifications happen afterwards.
    pub fn unmount(&mut self) {
        {
            let _session = self.lock_session();
            self.cancel.cancel();
        }
        self.polls.abort_all();
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl Drop for UploadWidget {
    fn drop(&mut self) {
        self.unmount();
    }
}
