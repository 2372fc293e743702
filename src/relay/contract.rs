use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, info};

use super::outputs::{extract_review, workflow_outputs};
use super::RelayService;
use crate::error::RelayError;
use crate::models::ContractReviewResponse;
use crate::provider::FileUpload;

/// Contract categories accepted from callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContractType {
    #[default]
    Service,
    Procurement,
}

impl ContractType {
    pub const SUPPORTED: [&'static str; 2] = ["service", "procurement"];

    /// Label the review workflow expects in its `HTtype` input.
    pub fn provider_label(self) -> &'static str {
        match self {
            ContractType::Service => "服务类",
            ContractType::Procurement => "采购类",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContractType::Service => "service",
            ContractType::Procurement => "procurement",
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractType {
    type Err = RelayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "service" => Ok(ContractType::Service),
            "procurement" => Ok(ContractType::Procurement),
            other => Err(RelayError::InvalidArgument(format!(
                "invalid contract type: {}. Supported types: {}",
                other,
                Self::SUPPORTED.join(", ")
            ))),
        }
    }
}

impl RelayService {
    /// Forward a file to the provider and return its upload record verbatim.
    pub async fn upload(&self, file: FileUpload) -> Result<Value, RelayError> {
        let filename = file.filename.clone();
        let reply = self
            .backend
            .upload_file(
                &self.provider.contract_api_key,
                &self.provider.user_tag,
                file,
                self.timeouts.upload(),
            )
            .await
            .map_err(|e| RelayError::Upload {
                status: 500,
                message: e.to_string(),
            })?;

        if !matches!(reply.status, 200 | 201) {
            error!("Upload of {} rejected with status {}", filename, reply.status);
            return Err(RelayError::Upload {
                status: reply.status,
                message: format!("status {}, error: {}", reply.status, reply.body),
            });
        }

        let record = reply.json()?;
        debug!("Uploaded {}: id={:?}", filename, record.get("id"));
        Ok(record)
    }

    pub async fn review_contract(
        &self,
        file: FileUpload,
        contract_type: &str,
    ) -> Result<ContractReviewResponse, RelayError> {
        let contract_type: ContractType = contract_type.parse()?;

        let record = self.upload(file).await?;
        let file_id = record
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                RelayError::InvalidArgument("file upload returned no file id".to_string())
            })?
            .to_string();

        info!(
            "Starting contract review: file_id={}, type={}",
            file_id,
            contract_type.provider_label()
        );

        let payload = review_payload(&file_id, contract_type, &self.provider.user_tag);
        let timeout = self.timeouts.contract();
        let reply = self
            .retry
            .run("contract review", timeout, || {
                self.backend
                    .run_workflow(&self.provider.contract_api_key, &payload, timeout)
            })
            .await?;

        let outputs = workflow_outputs(&reply.json()?);
        debug!(
            "Contract review output fields: {:?}",
            outputs.keys().collect::<Vec<_>>()
        );
        let review = extract_review(&outputs)?;
        info!("Contract review completed, result length: {}", review.len());

        Ok(ContractReviewResponse::reviewed(review))
    }
}

fn review_payload(file_id: &str, contract_type: ContractType, user: &str) -> Value {
    json!({
        "inputs": {
            "hetong": [{
                "type": "document",
                "transfer_method": "local_file",
                "upload_file_id": file_id,
            }],
            "HTtype": contract_type.provider_label(),
        },
        "response_mode": "blocking",
        "user": user,
    })
}
