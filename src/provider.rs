use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::RelayError;

/// Status and raw body of a provider reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    pub status: u16,
    pub body: String,
}

impl ProviderReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(&self) -> Result<Value, RelayError> {
        serde_json::from_str(&self.body).map_err(|e| RelayError::MalformedResponse(e.to_string()))
    }
}

/// Transport-level failures, before any HTTP status was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: Option<String>,
}

/// Calls understood by the workflow provider.
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// POST `files/upload` as multipart form data.
    async fn upload_file(
        &self,
        api_key: &str,
        user: &str,
        file: FileUpload,
        timeout: Duration,
    ) -> Result<ProviderReply, TransportError>;

    /// POST `workflows/run` with a JSON payload.
    async fn run_workflow(
        &self,
        api_key: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<ProviderReply, TransportError>;
}

/// HTTP implementation of [`WorkflowBackend`].
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    client: Client,
    base_url: String,
}

impl WorkflowClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn into_reply(response: reqwest::Response) -> Result<ProviderReply, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ProviderReply { status, body })
    }
}

/// Multipart `file` part. A content type that does not parse as a MIME type
/// is dropped rather than failing the upload.
fn file_part(file: FileUpload) -> Result<Part, reqwest::Error> {
    let part = Part::bytes(file.bytes).file_name(file.filename);
    match file.content_type {
        Some(content_type) if Part::text("").mime_str(&content_type).is_ok() => {
            part.mime_str(&content_type)
        }
        Some(content_type) => {
            warn!("Ignoring unparsable content type {:?} on upload", content_type);
            Ok(part)
        }
        None => Ok(part),
    }
}

#[async_trait]
impl WorkflowBackend for WorkflowClient {
    async fn upload_file(
        &self,
        api_key: &str,
        user: &str,
        file: FileUpload,
        timeout: Duration,
    ) -> Result<ProviderReply, TransportError> {
        let url = format!("{}/files/upload", self.base_url);
        debug!("Uploading {} ({} bytes) to {}", file.filename, file.bytes.len(), url);

        let form = Form::new()
            .part("file", file_part(file)?)
            .text("user", user.to_string())
            .text("type", "TXT");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .timeout(timeout)
            .send()
            .await?;
        Self::into_reply(response).await
    }

    async fn run_workflow(
        &self,
        api_key: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<ProviderReply, TransportError> {
        let url = format!("{}/workflows/run", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(payload)
            .timeout(timeout)
            .send()
            .await?;
        Self::into_reply(response).await
    }
}
