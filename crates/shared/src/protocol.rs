use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

pub const UPLOAD_PDF_PATH: &str = "/upload-pdf/";
pub const ASK_QUESTION_PATH: &str = "/ask-question/";
/// Name of the single multipart field carrying the document bytes.
pub const UPLOAD_FIELD_NAME: &str = "file";
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPdfResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskQuestionResponse {
    pub answer: String,
}

/// Loose view over any JSON object the service may return.
///
/// Both endpoints answer with a flat object carrying one of `message`,
/// `answer` or `error`; which one is present decides the outcome. Fields with a
/// non-string value are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceReply {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "string_or_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "string_or_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "string_or_none")]
    pub error: Option<String>,
}

impl ServiceReply {
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, ProtocolError> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(ProtocolError::UnexpectedShape {
                expected: "a JSON object",
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        _ => None,
    })
}
