use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::api::CandidateFile;

/// Tracks preview handles handed out for queued files.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<Mutex<HashMap<u64, String>>>,
    next_id: Arc<AtomicU64>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&self, file: &CandidateFile) -> PreviewHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = format!("preview://{}/{}", id, file.name);
        self.lock().insert(id, url.clone());

        PreviewHandle {
            id,
            url,
            registry: self.clone(),
        }
    }

    /// Number of handles acquired and not yet released
    pub fn live(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, id: u64) {
        self.lock().remove(&id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, String>> {
        // The map stays consistent even if a holder panicked
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Preview of a queued file. Released when dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}
