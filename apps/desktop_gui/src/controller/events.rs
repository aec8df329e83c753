//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{AskState, ControllerEvent, Notice, SelectedFileSummary, UploadState};

pub enum UiEvent {
    Info(String),
    Error(UiError),
    SelectionChanged(Option<SelectedFileSummary>),
    Upload(UploadState),
    Ask(AskState),
    Notice(Notice),
}

impl From<ControllerEvent> for UiEvent {
    fn from(event: ControllerEvent) -> Self {
        match event {
            ControllerEvent::SelectionChanged(summary) => Self::SelectionChanged(summary),
            ControllerEvent::UploadStateChanged(state) => Self::Upload(state),
            ControllerEvent::AskStateChanged(state) => Self::Ask(state),
            ControllerEvent::Notice(notice) => Self::Notice(notice),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    SelectFile,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            Self::BackendStartup => "startup",
            Self::SelectFile => "file selection",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("not found")
            || message_lower.contains("no such file")
            || message_lower.contains("permission denied")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Validation => "File",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::NoticeSeverity;
    use shared::domain::{FlowKind, FlowStatus};

    #[test]
    fn unreadable_file_is_a_validation_error() {
        let err = UiError::from_message(
            UiErrorContext::SelectFile,
            "failed to read '/tmp/x.pdf': No such file or directory (os error 2)",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
        assert_eq!(err.context(), UiErrorContext::SelectFile);
        assert_eq!(err_label(err.category()), "File");
    }

    #[test]
    fn startup_network_failure_is_transport() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "http client unavailable: connection setup failed",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }

    #[test]
    fn disconnected_command_processor_is_transport() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "Backend command processor disconnected (possible startup/runtime failure)",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }

    #[test]
    fn unrecognized_message_is_unknown() {
        let err = UiError::from_message(UiErrorContext::BackendStartup, "something odd");
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert_eq!(err.message(), "something odd");
    }

    #[test]
    fn controller_events_map_one_to_one() {
        let upload = UiEvent::from(ControllerEvent::UploadStateChanged(UploadState {
            status: FlowStatus::InFlight,
            message: None,
        }));
        assert!(matches!(upload, UiEvent::Upload(state) if state.is_in_flight()));

        let notice = UiEvent::from(ControllerEvent::Notice(Notice {
            flow: FlowKind::Upload,
            severity: NoticeSeverity::Error,
            message: "Select a PDF first!".to_string(),
        }));
        assert!(matches!(notice, UiEvent::Notice(n) if n.message == "Select a PDF first!"));

        let cleared = UiEvent::from(ControllerEvent::SelectionChanged(None));
        assert!(matches!(cleared, UiEvent::SelectionChanged(None)));
    }
}
