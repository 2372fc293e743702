use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::outputs::{extract_translation, workflow_outputs};
use super::RelayService;
use crate::error::RelayError;
use crate::models::{ConnectionStatus, TranslationRequest, TranslationResponse};
use crate::settings::TimeoutSettings;

/// Per-attempt timeout for a translation of `char_count` characters.
///
/// Grows linearly at `translation_chars_per_sec` and is clamped to
/// `[translation_min_secs, translation_max_secs]`.
pub fn translation_timeout(char_count: usize, timeouts: &TimeoutSettings) -> Duration {
    let secs = (char_count as f64 / timeouts.translation_chars_per_sec)
        .clamp(timeouts.translation_min_secs, timeouts.translation_max_secs);
    Duration::from_secs_f64(secs)
}

impl RelayService {
    /// Translate `request.text`.
    ///
    /// Only oversized input is returned as an error. Every later failure is
    /// reported inside the envelope with `success = false`.
    pub async fn translate(
        &self,
        request: TranslationRequest,
    ) -> Result<TranslationResponse, RelayError> {
        let length = request.text.chars().count();
        let limit = self.limits.max_translation_chars;
        if length > limit {
            warn!("Translation text too long ({} characters)", length);
            return Err(RelayError::TooLong { length, limit });
        }

        debug!(
            "Translation request: {} characters, {} -> {}",
            length, request.source_language, request.target_language
        );

        match self.run_translation(&request, length).await {
            Ok(text) => {
                info!("Translation succeeded, result length: {}", text.chars().count());
                Ok(TranslationResponse::translated(text))
            }
            Err(err) => {
                error!("Translation failed: {}", err);
                Ok(TranslationResponse::failed(err.to_string()))
            }
        }
    }

    async fn run_translation(
        &self,
        request: &TranslationRequest,
        length: usize,
    ) -> Result<String, RelayError> {
        let payload = json!({
            "inputs": {
                "source_text": request.text,
                "source_lang": request.source_language,
                "target_lang": request.target_language,
            },
            "response_mode": "blocking",
            "user": self.provider.user_tag,
        });

        let timeout = translation_timeout(length, &self.timeouts);
        debug!("Translation timeout: {:.1}s", timeout.as_secs_f64());

        let reply = self
            .retry
            .run("translation", timeout, || {
                self.backend
                    .run_workflow(&self.provider.translation_api_key, &payload, timeout)
            })
            .await?;

        let outputs = workflow_outputs(&reply.json()?);
        debug!(
            "Translation output fields: {:?}",
            outputs.keys().collect::<Vec<_>>()
        );
        extract_translation(&outputs)
    }

    /// Call the translation workflow once. Anything but a 404 counts as
    /// reachable.
    pub async fn check_connection(&self) -> ConnectionStatus {
        let payload: Value = json!({
            "inputs": {"test": "connection"},
            "response_mode": "blocking",
            "user": "test-user",
        });

        match self
            .backend
            .run_workflow(
                &self.provider.translation_api_key,
                &payload,
                self.timeouts.check(),
            )
            .await
        {
            Ok(reply) => {
                debug!("Connection check answered with {}", reply.status);
                ConnectionStatus {
                    connected: reply.status != 404,
                    status_code: Some(reply.status),
                    error: None,
                }
            }
            Err(err) => {
                warn!("Connection check failed: {}", err);
                ConnectionStatus {
                    connected: false,
                    status_code: None,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}
