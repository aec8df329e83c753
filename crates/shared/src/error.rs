use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error payload the service returns when it understood a request but could not
/// complete it, e.g. `{"error": "Corrupt PDF"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
}

impl ServiceErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("response body has none of the expected fields ({expected})")]
    UnexpectedShape { expected: &'static str },
}
