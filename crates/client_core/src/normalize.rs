//! Folding settled service calls into the three outcomes the flows react to.

use reqwest::StatusCode;
use shared::protocol::ServiceReply;

use crate::error::TransportFailure;

/// An HTTP exchange that completed, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawReply {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

pub type SettledCall = Result<RawReply, TransportFailure>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceOutcome<T> {
    Success(T),
    /// The service answered in the expected format but reported a logical failure.
    ApplicationError(String),
    /// No well-formed answer at all; the string is diagnostic detail for logs only.
    TransportError(String),
}

impl<T> ServiceOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::ApplicationError(_) => "application_error",
            Self::TransportError(_) => "transport_error",
        }
    }
}

pub fn normalize_upload_reply(settled: SettledCall) -> ServiceOutcome<String> {
    normalize_reply(settled, "message", |reply| reply.message.take())
}

pub fn normalize_ask_reply(settled: SettledCall) -> ServiceOutcome<String> {
    normalize_reply(settled, "answer", |reply| reply.answer.take())
}

// A success field only counts on a 2xx status; an `error` field counts on any status.
fn normalize_reply(
    settled: SettledCall,
    success_field: &'static str,
    take_success: impl FnOnce(&mut ServiceReply) -> Option<String>,
) -> ServiceOutcome<String> {
    let raw = match settled {
        Ok(raw) => raw,
        Err(err) => return ServiceOutcome::TransportError(err.to_string()),
    };

    let mut reply = match ServiceReply::from_json_bytes(&raw.body) {
        Ok(reply) => reply,
        Err(err) => {
            return ServiceOutcome::TransportError(format!("HTTP {}: {err}", raw.status));
        }
    };

    if raw.status.is_success() {
        if let Some(payload) = take_success(&mut reply) {
            return ServiceOutcome::Success(payload);
        }
    }

    match reply.error {
        Some(message) => ServiceOutcome::ApplicationError(message),
        None => ServiceOutcome::TransportError(format!(
            "HTTP {}: body carries neither `{success_field}` nor `error`",
            raw.status
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(status: u16, body: &str) -> SettledCall {
        Ok(RawReply::new(
            StatusCode::from_u16(status).expect("status"),
            body.as_bytes(),
        ))
    }

    #[test]
    fn upload_message_is_success() {
        assert_eq!(
            normalize_upload_reply(reply(200, r#"{"message":"Indexed 10 pages"}"#)),
            ServiceOutcome::Success("Indexed 10 pages".to_string())
        );
    }

    #[test]
    fn error_field_is_application_error_regardless_of_status() {
        for status in [200, 400, 422, 500] {
            assert_eq!(
                normalize_upload_reply(reply(status, r#"{"error":"Corrupt PDF"}"#)),
                ServiceOutcome::ApplicationError("Corrupt PDF".to_string()),
                "status {status}"
            );
        }
    }

    #[test]
    fn message_takes_precedence_over_error_on_success_status() {
        assert!(normalize_upload_reply(reply(
            201,
            r#"{"message":"stored","error":"ignored"}"#
        ))
        .is_success());
    }

    #[test]
    fn message_on_error_status_is_transport_error() {
        let outcome = normalize_upload_reply(reply(502, r#"{"message":"upstream ok"}"#));
        assert_eq!(outcome.kind(), "transport_error");
    }

    #[test]
    fn unexpected_shapes_are_transport_errors() {
        for body in ["", "null", "[]", r#"{"status":"ok"}"#, "<html>oops</html>"] {
            let outcome = normalize_upload_reply(reply(200, body));
            assert_eq!(outcome.kind(), "transport_error", "body {body:?}");
        }
    }

    #[test]
    fn failed_call_is_transport_error() {
        let outcome = normalize_ask_reply(Err(TransportFailure::Unavailable(
            "connection refused".to_string(),
        )));
        assert_eq!(
            outcome,
            ServiceOutcome::TransportError("connection refused".to_string())
        );
    }

    #[test]
    fn ask_answer_keeps_formatting() {
        assert_eq!(
            normalize_ask_reply(reply(200, r#"{"answer":"line one\n\n  line two"}"#)),
            ServiceOutcome::Success("line one\n\n  line two".to_string())
        );
    }

    #[test]
    fn ask_does_not_accept_upload_message_field() {
        let outcome = normalize_ask_reply(reply(200, r#"{"message":"Indexed 10 pages"}"#));
        assert_eq!(outcome.kind(), "transport_error");
    }

    #[test]
    fn ask_error_field_is_application_error() {
        assert_eq!(
            normalize_ask_reply(reply(200, r#"{"error":"No PDF Uploaded yet."}"#)),
            ServiceOutcome::ApplicationError("No PDF Uploaded yet.".to_string())
        );
    }
}
