use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use super::api::DocumentApi;
use crate::features::documents::dtos::DocumentStatusResponseDto;

/// Interval between status checks
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Consecutive failed checks tolerated before giving up on a document
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_consecutive_failures: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The document reached `verified` or `failed`.
    Terminal(DocumentStatusResponseDto),
    /// The token was cancelled before a terminal status was seen.
    Cancelled,
    /// Too many consecutive status checks failed.
    GaveUp { last_error: String },
}

/// Poll the status endpoint every `policy.interval` until the document is
/// terminal, the token is cancelled, or the failure budget runs out.
///
/// The first check happens one interval after the call. No check is issued
/// after a terminal status is observed or after cancellation; an in-flight
/// check is dropped when the token fires.
pub async fn poll_until_terminal(
    api: &dyn DocumentApi,
    document_id: Uuid,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> PollOutcome {
    let mut consecutive_failures = 0u32;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(policy.interval) => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled,
            result = api.status(document_id) => result,
        };

        match result {
            Ok(snapshot) if snapshot.status.is_terminal() => {
                debug!("Document {} reached {}", document_id, snapshot.status);
                return PollOutcome::Terminal(snapshot);
            }
            Ok(_) => {
                consecutive_failures = 0;
            }
            Err(e) => {
                consecutive_failures += 1;
                warn!(
                    "Status check {}/{} for document {} failed: {}",
                    consecutive_failures, policy.max_consecutive_failures, document_id, e
                );
                if consecutive_failures >= policy.max_consecutive_failures {
                    return PollOutcome::GaveUp {
                        last_error: e.to_string(),
                    };
                }
            }
        }
    }
}
