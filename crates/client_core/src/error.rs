use shared::domain::FlowKind;
use thiserror::Error;

/// Reasons a controller operation is refused before any request goes out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("no file selected for upload")]
    NoFileSelected,
    #[error("{0} request already in flight")]
    Busy(FlowKind),
}

/// A call that never produced a usable HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportFailure {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("{0}")]
    Unavailable(String),
}
