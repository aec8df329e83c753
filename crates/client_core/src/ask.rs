use shared::domain::{FlowKind, FlowStatus};

use crate::{error::FlowError, normalize::ServiceOutcome};

pub const ASK_FALLBACK_MESSAGE: &str = "Failed to get answer. Check your backend.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskState {
    pub status: FlowStatus,
    pub answer: Option<String>,
    pub error: Option<String>,
}

impl AskState {
    pub fn is_in_flight(&self) -> bool {
        self.status.is_in_flight()
    }

    /// Text for the answer area: the fallback after a failure, otherwise the
    /// latest answer (which stays visible while a new question is pending).
    pub fn display_text(&self) -> Option<&str> {
        self.error.as_deref().or(self.answer.as_deref())
    }
}

/// Result of [`AskFlow::begin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskStart {
    /// The query was blank; nothing changed.
    Skipped,
    Started { query: String },
}

#[derive(Debug, Default)]
pub struct AskFlow {
    query: String,
    state: AskState,
}

impl AskFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> &AskState {
        &self.state
    }

    /// Returns `false` when the text is unchanged.
    pub fn set_query(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if self.query == text {
            return false;
        }
        self.query = text;
        true
    }

    pub fn begin(&mut self) -> Result<AskStart, FlowError> {
        if self.query.trim().is_empty() {
            return Ok(AskStart::Skipped);
        }
        if self.state.is_in_flight() {
            return Err(FlowError::Busy(FlowKind::Ask));
        }
        self.state.status = FlowStatus::InFlight;
        Ok(AskStart::Started {
            query: self.query.clone(),
        })
    }

    pub fn settle(&mut self, outcome: ServiceOutcome<String>) -> &AskState {
        self.state = match outcome {
            ServiceOutcome::Success(answer) => AskState {
                status: FlowStatus::Succeeded,
                answer: Some(answer),
                error: None,
            },
            ServiceOutcome::ApplicationError(_) | ServiceOutcome::TransportError(_) => AskState {
                status: FlowStatus::Failed,
                answer: None,
                error: Some(ASK_FALLBACK_MESSAGE.to_string()),
            },
        };
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_is_skipped_without_state_change() {
        let mut flow = AskFlow::new();
        for text in ["", "   ", "\n\t"] {
            flow.set_query(text);
            assert_eq!(flow.begin().expect("begin"), AskStart::Skipped);
            assert_eq!(flow.state(), &AskState::default());
        }
    }

    #[test]
    fn setting_same_query_reports_no_change() {
        let mut flow = AskFlow::new();
        assert!(flow.set_query("What is the dataset size?"));
        assert!(!flow.set_query("What is the dataset size?"));
        assert!(flow.set_query(""));
    }

    #[test]
    fn previous_answer_visible_until_next_outcome() {
        let mut flow = AskFlow::new();
        flow.set_query("first");
        flow.begin().expect("begin");
        flow.settle(ServiceOutcome::Success("first answer".to_string()));

        flow.set_query("second");
        flow.begin().expect("begin");
        assert!(flow.state().is_in_flight());
        assert_eq!(flow.state().display_text(), Some("first answer"));

        let state = flow.settle(ServiceOutcome::Success("second answer".to_string()));
        assert_eq!(state.display_text(), Some("second answer"));
    }

    #[test]
    fn failure_replaces_answer_with_fallback() {
        let mut flow = AskFlow::new();
        flow.set_query("q");
        flow.begin().expect("begin");
        flow.settle(ServiceOutcome::Success("old".to_string()));

        flow.begin().expect("begin");
        let state = flow.settle(ServiceOutcome::ApplicationError("No PDF".to_string()));
        assert_eq!(state.status, FlowStatus::Failed);
        assert!(state.answer.is_none());
        assert_eq!(state.display_text(), Some(ASK_FALLBACK_MESSAGE));
    }

    #[test]
    fn second_begin_while_in_flight_is_busy() {
        let mut flow = AskFlow::new();
        flow.set_query("q");
        flow.begin().expect("begin");
        assert_eq!(flow.begin().expect_err("busy"), FlowError::Busy(FlowKind::Ask));
    }
}
