use async_trait::async_trait;
use reqwest::{multipart, Client};
use shared::protocol::{AskQuestionRequest, ASK_QUESTION_PATH, UPLOAD_FIELD_NAME, UPLOAD_PDF_PATH};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    error::TransportFailure,
    normalize::{RawReply, SettledCall},
    upload::SelectedFile,
};

/// The remote ingestion/answering service, as far as the client can see it.
///
/// Implementations only move bytes; interpreting the reply is left to
/// [`crate::normalize`].
#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn upload_pdf(&self, file: &SelectedFile) -> SettledCall;
    async fn ask_question(&self, query: &str) -> SettledCall;
}

pub struct MissingDocumentService;

#[async_trait]
impl DocumentService for MissingDocumentService {
    async fn upload_pdf(&self, _file: &SelectedFile) -> SettledCall {
        Err(TransportFailure::Unavailable(
            "document service is unavailable".to_string(),
        ))
    }

    async fn ask_question(&self, _query: &str) -> SettledCall {
        Err(TransportFailure::Unavailable(
            "document service is unavailable".to_string(),
        ))
    }
}

pub struct HttpDocumentService {
    http: Client,
    service_url: Url,
}

impl HttpDocumentService {
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportFailure> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            service_url: settings.service_url.clone(),
        })
    }

    pub fn service_url(&self) -> &Url {
        &self.service_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportFailure> {
        endpoint_url(&self.service_url, path)
    }
}

/// Appends `path` to the base address, keeping any path prefix the base carries.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, TransportFailure> {
    let base = base.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}{path}"))?)
}

async fn read_reply(response: reqwest::Response) -> SettledCall {
    let status = response.status();
    let body = response.bytes().await?;
    debug!(%status, bytes = body.len(), "service replied");
    Ok(RawReply::new(status, body.to_vec()))
}

#[async_trait]
impl DocumentService for HttpDocumentService {
    async fn upload_pdf(&self, file: &SelectedFile) -> SettledCall {
        let part = multipart::Part::bytes(file.bytes().to_vec())
            .file_name(file.display_name().to_string())
            .mime_str(file.media_type())?;
        let form = multipart::Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .http
            .post(self.endpoint(UPLOAD_PDF_PATH)?)
            .multipart(form)
            .send()
            .await?;
        read_reply(response).await
    }

    async fn ask_question(&self, query: &str) -> SettledCall {
        let response = self
            .http
            .post(self.endpoint(ASK_QUESTION_PATH)?)
            .json(&AskQuestionRequest {
                query: query.to_string(),
            })
            .send()
            .await?;
        read_reply(response).await
    }
}
