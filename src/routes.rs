use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::RelayError;
use crate::models::{
    ConnectionStatus, ContractReviewResponse, TranslationRequest, TranslationResponse,
};
use crate::provider::FileUpload;
use crate::relay::ContractType;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "ai-toolbox-backend";

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Liveness
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/health", get(health_check))
        // Contract review
        .route("/api/contract/upload", post(upload_contract))
        .route("/api/contract/review", post(review_contract))
        // Translation
        .route("/api/translation/translate", post(translate))
        .route("/api/translation/check", get(check_translation))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "AI toolbox backend API is running" }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn upload_contract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Value>, RelayError> {
    let form = ContractForm::read(multipart?).await?;
    let file = form.require_file()?;
    info!("Uploading contract file: {}", file.filename);
    let record = state.relay.upload(file).await?;
    Ok(Json(record))
}

async fn review_contract(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ContractReviewResponse>, RelayError> {
    let form = ContractForm::read(multipart?).await?;
    let contract_type = form
        .contract_type
        .clone()
        .unwrap_or_else(|| ContractType::default().to_string());
    let file = form.require_file()?;
    info!(
        "Contract review requested: file={}, type={}",
        file.filename, contract_type
    );
    let response = state.relay.review_contract(file, &contract_type).await?;
    Ok(Json(response))
}

async fn translate(
    State(state): State<AppState>,
    request: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, RelayError> {
    let Json(request) = request?;
    let response = state.relay.translate(request).await?;
    Ok(Json(response))
}

async fn check_translation(State(state): State<AppState>) -> Json<ConnectionStatus> {
    Json(state.relay.check_connection().await)
}

/// Fields accepted by the contract endpoints.
#[derive(Debug, Default)]
struct ContractForm {
    file: Option<FileUpload>,
    contract_type: Option<String>,
}

impl ContractForm {
    async fn read(mut multipart: Multipart) -> Result<Self, RelayError> {
        let mut form = ContractForm::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    let filename = field.file_name().unwrap_or("upload.txt").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.file = Some(FileUpload {
                        bytes: bytes.to_vec(),
                        filename,
                        content_type,
                    });
                }
                Some("contract_type") => {
                    form.contract_type = Some(field.text().await.map_err(multipart_error)?);
                }
                other => debug!("Ignoring multipart field {:?}", other),
            }
        }
        Ok(form)
    }

    fn require_file(self) -> Result<FileUpload, RelayError> {
        self.file.ok_or_else(|| {
            RelayError::InvalidArgument("multipart field 'file' is required".to_string())
        })
    }
}

fn multipart_error(err: MultipartError) -> RelayError {
    RelayError::InvalidArgument(format!("invalid multipart body: {}", err.body_text()))
}
