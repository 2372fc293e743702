mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mockito::Matcher;
use serde_json::json;

use common::{app_for, json_body, json_request, multipart_request, send};

fn workflow_reply(outputs: serde_json::Value) -> String {
    json!({
        "workflow_run_id": "run-1",
        "data": {"status": "succeeded", "outputs": outputs}
    })
    .to_string()
}

#[tokio::test]
async fn health_endpoints_report_healthy() {
    for uri in ["/health", "/api/health"] {
        let response = send(
            app_for("http://127.0.0.1:1"),
            Request::get(uri).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "ai-toolbox-backend");
    }

    let response = send(
        app_for("http://127.0.0.1:1"),
        Request::get("/").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json_body(response).await["message"].is_string());
}

#[tokio::test]
async fn translate_relays_translation_field() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/workflows/run")
        .match_header("authorization", "Bearer translation-key")
        .match_body(Matcher::PartialJson(json!({
            "inputs": {"source_text": "hello", "source_lang": "en", "target_lang": "fr"},
            "response_mode": "blocking",
            "user": "ai-toolbox-user"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(workflow_reply(json!({"Translation": "bonjour"})))
        .expect(1)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        json_request(
            "POST",
            "/api/translation/translate",
            json!({"text": "hello", "source_language": "en", "target_language": "fr"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({"success": true, "data": {"translatedText": "bonjour", "confidence": 0.95}})
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn oversized_translation_returns_413_without_calling_provider() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/workflows/run")
        .expect(0)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        json_request(
            "POST",
            "/api/translation/translate",
            json!({"text": "x".repeat(5001), "source_language": "en", "target_language": "de"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(response).await["detail"]
        .as_str()
        .unwrap()
        .contains("5001"));
    mock.assert_async().await;
}

#[tokio::test]
async fn translation_failures_are_reported_in_envelope() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/workflows/run")
        .with_status(500)
        .with_body("provider exploded")
        .expect(3)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        json_request(
            "POST",
            "/api/translation/translate",
            json!({"text": "hello", "source_language": "en", "target_language": "fr"}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["translatedText"], "");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("3 attempts"), "{message}");
    assert!(message.contains("provider exploded"), "{message}");
    mock.assert_async().await;
}

#[tokio::test]
async fn translation_recovers_after_two_failures() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/workflows/run")
        .with_status(500)
        .expect(2)
        .create_async()
        .await;
    let succeeding = server
        .mock("POST", "/workflows/run")
        .with_status(200)
        .with_body(workflow_reply(json!({"translated_text": "hallo"})))
        .expect(1)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        json_request(
            "POST",
            "/api/translation/translate",
            json!({"text": "hello", "source_language": "en", "target_language": "de"}),
        ),
    )
    .await;

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["translatedText"], "hallo");
    failing.assert_async().await;
    succeeding.assert_async().await;
}

#[tokio::test]
async fn review_uploads_file_then_runs_workflow() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/files/upload")
        .match_header("authorization", "Bearer contract-key")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("ai-toolbox-user".to_string()),
            Matcher::Regex("TXT".to_string()),
            Matcher::Regex("party A shall".to_string()),
        ]))
        .with_status(201)
        .with_body(r#"{"id": "file-42", "name": "contract.txt", "size": 13}"#)
        .expect(1)
        .create_async()
        .await;
    let run = server
        .mock("POST", "/workflows/run")
        .match_header("authorization", "Bearer contract-key")
        .match_body(Matcher::PartialJson(json!({
            "inputs": {
                "hetong": [{
                    "type": "document",
                    "transfer_method": "local_file",
                    "upload_file_id": "file-42"
                }],
                "HTtype": "采购类"
            }
        })))
        .with_status(200)
        .with_body(workflow_reply(json!({"review": "Payment terms are missing."})))
        .expect(1)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        multipart_request(
            "/api/contract/review",
            Some(("contract.txt", "party A shall")),
            &[("contract_type", "procurement")],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": {
                "riskLevel": "medium",
                "suggestions": ["Payment terms are missing."],
                "issues": []
            }
        })
    );
    upload.assert_async().await;
    run.assert_async().await;
}

#[tokio::test]
async fn review_defaults_to_service_contracts() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/files/upload")
        .with_status(200)
        .with_body(r#"{"id": "file-7"}"#)
        .create_async()
        .await;
    let run = server
        .mock("POST", "/workflows/run")
        .match_body(Matcher::PartialJson(json!({"inputs": {"HTtype": "服务类"}})))
        .with_status(200)
        .with_body(workflow_reply(json!({"text": "Looks fine."})))
        .expect(1)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        multipart_request("/api/contract/review", Some(("c.txt", "terms")), &[]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    run.assert_async().await;
}

#[tokio::test]
async fn review_rejects_unknown_contract_type_before_upload() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/files/upload")
        .expect(0)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        multipart_request(
            "/api/contract/review",
            Some(("c.txt", "terms")),
            &[("contract_type", "employment")],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("employment"), "{detail}");
    upload.assert_async().await;
}

#[tokio::test]
async fn review_surfaces_provider_status_after_retries() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/files/upload")
        .with_status(201)
        .with_body(r#"{"id": "file-9"}"#)
        .create_async()
        .await;
    let run = server
        .mock("POST", "/workflows/run")
        .with_status(503)
        .with_body("workflow busy")
        .expect(3)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        multipart_request("/api/contract/review", Some(("c.txt", "terms")), &[]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("3 attempts"), "{detail}");
    assert!(detail.contains("workflow busy"), "{detail}");
    run.assert_async().await;
}

#[tokio::test]
async fn review_without_usable_output_is_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/files/upload")
        .with_status(201)
        .with_body(r#"{"id": "file-9"}"#)
        .create_async()
        .await;
    let _run = server
        .mock("POST", "/workflows/run")
        .with_status(200)
        .with_body(workflow_reply(json!({"summary": ""})))
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        multipart_request("/api/contract/review", Some(("c.txt", "terms")), &[]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("summary"), "{detail}");
}

#[tokio::test]
async fn upload_relays_provider_record_and_errors() {
    let mut server = mockito::Server::new_async().await;
    let _upload = server
        .mock("POST", "/files/upload")
        .with_status(201)
        .with_body(r#"{"id": "file-1", "name": "c.txt", "extension": "txt"}"#)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        multipart_request("/api/contract/upload", Some(("c.txt", "terms")), &[]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"id": "file-1", "name": "c.txt", "extension": "txt"})
    );

    let mut failing = mockito::Server::new_async().await;
    let rejected = failing
        .mock("POST", "/files/upload")
        .with_status(415)
        .with_body("unsupported file type")
        .expect(1)
        .create_async()
        .await;

    let response = send(
        app_for(&failing.url()),
        multipart_request("/api/contract/upload", Some(("c.exe", "MZ")), &[]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("unsupported file type"), "{detail}");
    rejected.assert_async().await;
}

#[tokio::test]
async fn upload_requires_file_part() {
    let response = send(
        app_for("http://127.0.0.1:1"),
        multipart_request("/api/contract/upload", None, &[("contract_type", "service")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_translation_body_renders_detail() {
    let response = send(
        app_for("http://127.0.0.1:1"),
        json_request("POST", "/api/translation/translate", json!({"lang": "en"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = json_body(response).await;
    assert!(body["detail"].is_string(), "{body}");
}

#[tokio::test]
async fn non_multipart_review_renders_detail() {
    let response = send(
        app_for("http://127.0.0.1:1"),
        json_request("POST", "/api/contract/review", json!({"contract_type": "service"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["content-type"], "application/json");
    let body = json_body(response).await;
    assert!(body["detail"].is_string(), "{body}");
}

#[tokio::test]
async fn check_reports_status_code() {
    let mut server = mockito::Server::new_async().await;
    let check = server
        .mock("POST", "/workflows/run")
        .match_header("authorization", "Bearer translation-key")
        .match_body(Matcher::PartialJson(json!({
            "inputs": {"test": "connection"},
            "user": "test-user"
        })))
        .with_status(400)
        .with_body(r#"{"code": "invalid_param"}"#)
        .expect(1)
        .create_async()
        .await;

    let response = send(
        app_for(&server.url()),
        Request::get("/api/translation/check").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"connected": true, "status_code": 400})
    );
    check.assert_async().await;
}

#[tokio::test]
async fn check_reports_unreachable_provider() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let response = send(
        app_for(&format!("http://{addr}")),
        Request::get("/api/translation/check").body(Body::empty()).unwrap(),
    )
    .await;

    let body = json_body(response).await;
    assert_eq!(body["connected"], false);
    assert!(body["error"].is_string());
    assert!(body.get("status_code").is_none());
}

#[tokio::test]
async fn cors_preflight_allows_configured_origins_only() {
    let preflight = |origin: &str| {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/translation/translate")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = send(app_for("http://127.0.0.1:1"), preflight("http://localhost:5173")).await;
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(allowed.headers()["access-control-allow-credentials"], "true");

    let denied = send(app_for("http://127.0.0.1:1"), preflight("http://evil.example")).await;
    assert!(denied.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = send(
        app_for("http://127.0.0.1:1"),
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    let id = response.headers()["x-request-id"].to_str().unwrap();
    assert!(id.starts_with("req-"), "{id}");

    let response = send(
        app_for("http://127.0.0.1:1"),
        Request::get("/health")
            .header("x-request-id", "caller-supplied")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.headers()["x-request-id"], "caller-supplied");
}
