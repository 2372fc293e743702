use axum::{
    extract::{multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures surfaced by the relay, each mapped onto an HTTP status.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{0}")]
    InvalidArgument(String),

    /// Request body the extractor could not parse.
    #[error("{message}")]
    BadRequest { status: u16, message: String },

    #[error(
        "text is too long ({length} characters); \
         translate at most {limit} characters per request"
    )]
    TooLong { length: usize, limit: usize },

    #[error("file upload failed: {message}")]
    Upload { status: u16, message: String },

    #[error(
        "{operation} workflow call failed after {attempts} attempts: \
         status {status}, error: {body}"
    )]
    WorkflowCall {
        operation: &'static str,
        attempts: u32,
        status: u16,
        body: String,
    },

    #[error(
        "{operation} request timed out after {attempts} attempts \
         ({timeout_secs}s each): {message}"
    )]
    Timeout {
        operation: &'static str,
        attempts: u32,
        timeout_secs: f64,
        message: String,
    },

    #[error("{operation} request failed after {attempts} attempts: {message}")]
    Transport {
        operation: &'static str,
        attempts: u32,
        message: String,
    },

    #[error(
        "no usable result in provider output; available fields: {}",
        describe_fields(.available)
    )]
    EmptyResult { available: Vec<String> },

    #[error("failed to parse provider response: {0}")]
    MalformedResponse(String),
}

fn describe_fields(fields: &[String]) -> String {
    if fields.is_empty() {
        "none".to_string()
    } else {
        fields.join(", ")
    }
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            RelayError::TooLong { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::BadRequest { status, .. }
            | RelayError::Upload { status, .. }
            | RelayError::WorkflowCall { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            RelayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Transport { .. }
            | RelayError::EmptyResult { .. }
            | RelayError::MalformedResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        RelayError::BadRequest {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartRejection> for RelayError {
    fn from(rejection: MultipartRejection) -> Self {
        RelayError::BadRequest {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.to_string();
        error!("Request failed with {}: {}", status, detail);
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
