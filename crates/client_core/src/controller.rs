//! Async orchestration of the upload and ask flows.
//!
//! Each flow sits behind its own lock, which is never held across the network
//! call, so an upload and a question can be pending at the same time. State
//! changes are published on a broadcast channel for front-ends.

use std::sync::Arc;

use shared::domain::{FlowKind, FlowStatus};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    ask::{AskFlow, AskStart, AskState},
    config::ClientSettings,
    error::{FlowError, TransportFailure},
    normalize::{normalize_ask_reply, normalize_upload_reply, ServiceOutcome},
    transport::{DocumentService, HttpDocumentService},
    upload::{
        SelectedFile, SelectedFileSummary, UploadFlow, UploadState, NO_FILE_SELECTED_MESSAGE,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// An interrupting, dismiss-to-continue message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub flow: FlowKind,
    pub severity: NoticeSeverity,
    pub message: String,
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    SelectionChanged(Option<SelectedFileSummary>),
    UploadStateChanged(UploadState),
    AskStateChanged(AskState),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskSubmission {
    /// Blank query: no request, no state change.
    Skipped,
    Settled(AskState),
}

pub struct QaController {
    service: Arc<dyn DocumentService>,
    upload: Mutex<UploadFlow>,
    ask: Mutex<AskFlow>,
    events: broadcast::Sender<ControllerEvent>,
}

impl QaController {
    pub fn new(service: Arc<dyn DocumentService>) -> Arc<Self> {
        Self::with_event_capacity(service, ClientSettings::default().event_capacity)
    }

    pub fn with_event_capacity(service: Arc<dyn DocumentService>, capacity: usize) -> Arc<Self> {
        let (events, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            service,
            upload: Mutex::new(UploadFlow::new()),
            ask: Mutex::new(AskFlow::new()),
            events,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Arc<Self>, TransportFailure> {
        let service = HttpDocumentService::new(settings)?;
        info!(service_url = %service.service_url(), "document service configured");
        Ok(Self::with_event_capacity(
            Arc::new(service),
            settings.event_capacity,
        ))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine; state stays queryable.
        let _ = self.events.send(event);
    }

    pub async fn upload_state(&self) -> UploadState {
        self.upload.lock().await.state().clone()
    }

    pub async fn selected_file(&self) -> Option<SelectedFileSummary> {
        self.upload.lock().await.selected().map(SelectedFile::summary)
    }

    pub async fn ask_state(&self) -> AskState {
        self.ask.lock().await.state().clone()
    }

    pub async fn query(&self) -> String {
        self.ask.lock().await.query().to_string()
    }

    /// Replaces the selection. No content checks happen here.
    pub async fn select_file(&self, file: SelectedFile) -> bool {
        let summary = file.summary();
        let changed = self.upload.lock().await.select(file);
        if changed {
            debug!(file = %summary.display_name, bytes = summary.size_bytes, "file selected");
            self.emit(ControllerEvent::SelectionChanged(Some(summary)));
        }
        changed
    }

    pub async fn clear_selection(&self) -> bool {
        let changed = self.upload.lock().await.clear_selection();
        if changed {
            self.emit(ControllerEvent::SelectionChanged(None));
        }
        changed
    }

    pub async fn set_query(&self, text: impl Into<String>) -> bool {
        self.ask.lock().await.set_query(text)
    }

    /// Uploads the selected file.
    ///
    /// Fails with [`FlowError::NoFileSelected`] (and a notice) when nothing is
    /// selected, or [`FlowError::Busy`] while a previous upload is pending.
    /// Otherwise the returned state is `Succeeded` or `Failed`.
    pub async fn submit_upload(&self) -> Result<UploadState, FlowError> {
        let (pending, in_flight) = {
            let mut flow = self.upload.lock().await;
            match flow.begin() {
                Ok(pending) => (pending, flow.state().clone()),
                Err(err) => {
                    drop(flow);
                    self.reject(FlowKind::Upload, &err);
                    return Err(err);
                }
            }
        };
        self.emit(ControllerEvent::UploadStateChanged(in_flight));

        info!(
            flow = "upload",
            file = %pending.file.display_name(),
            bytes = pending.file.len(),
            "uploading document"
        );
        let outcome = normalize_upload_reply(self.service.upload_pdf(&pending.file).await);
        log_outcome(FlowKind::Upload, &outcome);

        let (state, selection_cleared) = {
            let mut flow = self.upload.lock().await;
            let had_selection = flow.selected().is_some();
            let state = flow.settle(&pending, outcome).clone();
            (state, had_selection && flow.selected().is_none())
        };

        self.emit(ControllerEvent::UploadStateChanged(state.clone()));
        if selection_cleared {
            self.emit(ControllerEvent::SelectionChanged(None));
        }
        if let Some(message) = &state.message {
            let severity = match state.status {
                FlowStatus::Succeeded => NoticeSeverity::Info,
                _ => NoticeSeverity::Error,
            };
            self.emit(ControllerEvent::Notice(Notice {
                flow: FlowKind::Upload,
                severity,
                message: message.clone(),
            }));
        }
        Ok(state)
    }

    /// Asks the current query. A blank query is skipped silently.
    pub async fn submit_ask(&self) -> Result<AskSubmission, FlowError> {
        let (query, in_flight) = {
            let mut flow = self.ask.lock().await;
            match flow.begin() {
                Ok(AskStart::Started { query }) => (query, flow.state().clone()),
                Ok(AskStart::Skipped) => {
                    debug!(flow = "ask", "blank query, nothing to ask");
                    return Ok(AskSubmission::Skipped);
                }
                Err(err) => {
                    drop(flow);
                    self.reject(FlowKind::Ask, &err);
                    return Err(err);
                }
            }
        };
        self.emit(ControllerEvent::AskStateChanged(in_flight));

        info!(flow = "ask", query_chars = query.chars().count(), "asking question");
        let outcome = normalize_ask_reply(self.service.ask_question(&query).await);
        log_outcome(FlowKind::Ask, &outcome);

        let state = self.ask.lock().await.settle(outcome).clone();
        self.emit(ControllerEvent::AskStateChanged(state.clone()));
        Ok(AskSubmission::Settled(state))
    }

    fn reject(&self, flow: FlowKind, err: &FlowError) {
        match err {
            FlowError::NoFileSelected => {
                warn!(%flow, "upload requested without a selected file");
                self.emit(ControllerEvent::Notice(Notice {
                    flow,
                    severity: NoticeSeverity::Error,
                    message: NO_FILE_SELECTED_MESSAGE.to_string(),
                }));
            }
            FlowError::Busy(_) => {
                warn!(%flow, "request rejected, previous one still in flight");
            }
        }
    }
}

fn log_outcome(flow: FlowKind, outcome: &ServiceOutcome<String>) {
    match outcome {
        ServiceOutcome::Success(payload) => {
            info!(%flow, payload_chars = payload.chars().count(), "service request succeeded");
        }
        ServiceOutcome::ApplicationError(message) => {
            warn!(%flow, error = %message, "service reported a failure");
        }
        ServiceOutcome::TransportError(detail) => {
            error!(%flow, error = %detail, "service request failed");
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
