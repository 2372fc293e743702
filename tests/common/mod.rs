//! Shared helpers for integration tests.

#![allow(dead_code)]

use ai_toolbox_backend::{build_app, AppState, Settings};
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

pub const BOUNDARY: &str = "relay-test-boundary";

/// Settings pointing at a mock provider.
pub fn settings_for(base_url: &str) -> Settings {
    let mut settings = Settings::default();
    settings.provider.base_url = base_url.to_string();
    settings.provider.contract_api_key = "contract-key".to_string();
    settings.provider.translation_api_key = "translation-key".to_string();
    settings
}

pub fn app_for(base_url: &str) -> Router {
    build_app(AppState::new(settings_for(base_url)))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart request with an optional `file` part and extra text fields.
pub fn multipart_request(
    uri: &str,
    file: Option<(&str, &str)>,
    fields: &[(&str, &str)],
) -> Request<Body> {
    let mut body = String::new();
    if let Some((filename, content)) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             {content}\r\n"
        ));
    }
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
