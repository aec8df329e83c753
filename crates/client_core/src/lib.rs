//! Client-side controller for a remote PDF question-answering service.
//!
//! The service does all parsing, indexing and answering. This crate keeps the
//! two user flows (upload a document, ask a question) honest: one request at a
//! time per flow, preconditions checked before anything goes on the wire, and
//! every reply folded into a user-facing outcome.

pub mod ask;
pub mod config;
pub mod controller;
pub mod error;
pub mod normalize;
pub mod transport;
pub mod upload;

pub use ask::{AskState, ASK_FALLBACK_MESSAGE};
pub use config::{load_settings, ClientSettings};
pub use controller::{AskSubmission, ControllerEvent, Notice, NoticeSeverity, QaController};
pub use error::{FlowError, TransportFailure};
pub use normalize::{RawReply, ServiceOutcome};
pub use transport::{DocumentService, HttpDocumentService, MissingDocumentService};
pub use upload::{
    SelectedFile, SelectedFileSummary, UploadState, NO_FILE_SELECTED_MESSAGE,
    UPLOAD_FALLBACK_MESSAGE,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
