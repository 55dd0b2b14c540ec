//! Client side of the document flow: a headless upload widget that submits
//! queued files and polls each document until verification settles.

mod api;
mod notifier;
mod poller;
mod preview;
mod widget;

#[cfg(test)]
mod testing;

pub use api::{CandidateFile, ClientError, DocumentApi, HttpDocumentApi};
pub use notifier::{NotificationSink, TracingNotifier};
pub use poller::{poll_until_terminal, PollOutcome, PollPolicy};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use widget::{EntryState, FileEntry, UploadWidget};
