use std::{fmt, path::Path, sync::Arc};

use anyhow::Context;
use shared::domain::{FlowKind, FlowStatus};

use crate::{error::FlowError, normalize::ServiceOutcome};

pub const NO_FILE_SELECTED_MESSAGE: &str = "Select a PDF first!";
pub const UPLOAD_FALLBACK_MESSAGE: &str = "Failed to upload PDF. Check backend logs.";

/// A document picked by the user and not yet confirmed by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    bytes: Arc<[u8]>,
    display_name: String,
    media_type: String,
}

impl SelectedFile {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        display_name: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            display_name: display_name.into(),
            media_type: media_type.into(),
        }
    }

    /// Reads `path` and guesses the media type from its extension.
    pub async fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let media_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(bytes, display_name, media_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn summary(&self) -> SelectedFileSummary {
        SelectedFileSummary {
            display_name: self.display_name.clone(),
            media_type: self.media_type.clone(),
            size_bytes: self.bytes.len() as u64,
        }
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("display_name", &self.display_name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// What a front-end needs to render the selection without holding the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFileSummary {
    pub display_name: String,
    pub media_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    pub status: FlowStatus,
    /// Server confirmation on success, user-facing failure text on failure.
    pub message: Option<String>,
}

impl UploadState {
    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }
}

/// Snapshot handed to the caller for the duration of one upload request.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file: SelectedFile,
    selection_id: u64,
}

/// Upload state machine. Holds no I/O; the controller drives it around the request.
#[derive(Debug, Default)]
pub struct UploadFlow {
    selected: Option<SelectedFile>,
    selection_id: u64,
    state: UploadState,
}

impl UploadFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    /// Replaces the selection. Returns `false` when `file` is already selected.
    pub fn select(&mut self, file: SelectedFile) -> bool {
        if self.selected.as_ref() == Some(&file) {
            return false;
        }
        self.selected = Some(file);
        self.selection_id += 1;
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        if self.selected.take().is_none() {
            return false;
        }
        self.selection_id += 1;
        true
    }

    pub fn begin(&mut self) -> Result<PendingUpload, FlowError> {
        if self.state.is_in_flight() {
            return Err(FlowError::Busy(FlowKind::Upload));
        }
        let file = self.selected.clone().ok_or(FlowError::NoFileSelected)?;
        self.state = UploadState {
            status: FlowStatus::InFlight,
            message: None,
        };
        Ok(PendingUpload {
            file,
            selection_id: self.selection_id,
        })
    }

    /// Leaves `InFlight`. A successful upload clears the selection unless the
    /// user picked a different file while the request was pending.
    pub fn settle(&mut self, pending: &PendingUpload, outcome: ServiceOutcome<String>) -> &UploadState {
        self.state = match outcome {
            ServiceOutcome::Success(message) => {
                if self.selection_id == pending.selection_id {
                    self.clear_selection();
                }
                UploadState {
                    status: FlowStatus::Succeeded,
                    message: Some(message),
                }
            }
            ServiceOutcome::ApplicationError(error) => UploadState {
                status: FlowStatus::Failed,
                message: Some(format!("Upload failed: {error}")),
            },
            ServiceOutcome::TransportError(_) => UploadState {
                status: FlowStatus::Failed,
                message: Some(UPLOAD_FALLBACK_MESSAGE.to_string()),
            },
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> SelectedFile {
        SelectedFile::new(b"%PDF-1.7 test".to_vec(), name, "application/pdf")
    }

    #[test]
    fn begin_without_selection_is_rejected_and_stays_idle() {
        let mut flow = UploadFlow::new();
        assert_eq!(flow.begin().expect_err("no file"), FlowError::NoFileSelected);
        assert_eq!(flow.state().status, FlowStatus::Idle);
    }

    #[test]
    fn selecting_same_file_twice_is_a_no_op() {
        let mut flow = UploadFlow::new();
        assert!(flow.select(pdf("paper.pdf")));
        let id = flow.selection_id;
        assert!(!flow.select(pdf("paper.pdf")));
        assert_eq!(flow.selection_id, id);
        assert!(flow.select(pdf("other.pdf")));
    }

    #[test]
    fn second_begin_while_in_flight_is_busy() {
        let mut flow = UploadFlow::new();
        flow.select(pdf("paper.pdf"));
        let _pending = flow.begin().expect("begin");
        assert!(flow.state().is_in_flight());
        assert_eq!(
            flow.begin().expect_err("busy"),
            FlowError::Busy(FlowKind::Upload)
        );
    }

    #[test]
    fn success_clears_selection_and_keeps_server_message() {
        let mut flow = UploadFlow::new();
        flow.select(pdf("paper.pdf"));
        let pending = flow.begin().expect("begin");
        let state = flow
            .settle(&pending, ServiceOutcome::Success("Indexed 10 pages".to_string()))
            .clone();

        assert_eq!(state.status, FlowStatus::Succeeded);
        assert_eq!(state.message.as_deref(), Some("Indexed 10 pages"));
        assert!(flow.selected().is_none());
    }

    #[test]
    fn success_keeps_a_selection_made_during_the_request() {
        let mut flow = UploadFlow::new();
        flow.select(pdf("first.pdf"));
        let pending = flow.begin().expect("begin");
        flow.select(pdf("second.pdf"));
        flow.settle(&pending, ServiceOutcome::Success("ok".to_string()));

        assert_eq!(
            flow.selected().map(SelectedFile::display_name),
            Some("second.pdf")
        );
    }

    #[test]
    fn failures_keep_selection_for_another_attempt() {
        let mut flow = UploadFlow::new();
        flow.select(pdf("paper.pdf"));

        let pending = flow.begin().expect("begin");
        let state = flow
            .settle(&pending, ServiceOutcome::ApplicationError("Corrupt PDF".to_string()))
            .clone();
        assert_eq!(state.status, FlowStatus::Failed);
        assert_eq!(state.message.as_deref(), Some("Upload failed: Corrupt PDF"));
        assert!(flow.selected().is_some());

        let pending = flow.begin().expect("retry");
        let state = flow
            .settle(&pending, ServiceOutcome::TransportError("reset by peer".to_string()))
            .clone();
        assert_eq!(state.message.as_deref(), Some(UPLOAD_FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn from_path_guesses_pdf_media_type() {
        let path = std::env::temp_dir().join(format!(
            "client_core_upload_{}.pdf",
            std::process::id()
        ));
        tokio::fs::write(&path, b"%PDF-1.4").await.expect("write");

        let file = SelectedFile::from_path(&path).await.expect("load");
        assert_eq!(file.media_type(), "application/pdf");
        assert_eq!(file.bytes(), b"%PDF-1.4");
        assert!(file.display_name().ends_with(".pdf"));

        tokio::fs::remove_file(&path).await.expect("cleanup");
    }
}
