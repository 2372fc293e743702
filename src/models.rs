use serde::{Deserialize, Serialize};

/// Confidence reported for every successful translation.
pub const TRANSLATION_CONFIDENCE: f64 = 0.95;

/// Risk level attached to every contract review.
pub const DEFAULT_RISK_LEVEL: &str = "medium";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

/// Fixed `{success, data, message}` shape returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationData {
    pub translated_text: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractReviewData {
    pub risk_level: String,
    pub suggestions: Vec<String>,
    pub issues: Vec<String>,
}

pub type TranslationResponse = Envelope<TranslationData>;
pub type ContractReviewResponse = Envelope<ContractReviewData>;

impl TranslationResponse {
    pub fn translated(text: String) -> Self {
        Self {
            success: true,
            data: TranslationData {
                translated_text: text,
                confidence: TRANSLATION_CONFIDENCE,
            },
            message: None,
        }
    }

    pub fn failed(message: String) -> Self {
        Self {
            success: false,
            data: TranslationData {
                translated_text: String::new(),
                confidence: 0.0,
            },
            message: Some(message),
        }
    }
}

impl ContractReviewResponse {
    pub fn reviewed(review: String) -> Self {
        Self {
            success: true,
            data: ContractReviewData {
                risk_level: DEFAULT_RISK_LEVEL.to_string(),
                suggestions: vec![review],
                issues: Vec::new(),
            },
            message: None,
        }
    }
}

/// Result of probing the translation workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
