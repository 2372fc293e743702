use serde_json::{Map, Value};

use crate::error::RelayError;

/// Fields checked after `text` when reading a contract review.
const REVIEW_FALLBACK_FIELDS: [&str; 5] = ["result", "output", "content", "review", "analysis"];

/// Fields checked after `Translation` when reading a translation.
const TRANSLATION_FALLBACK_FIELDS: [&str; 6] = [
    "text",
    "translated_text",
    "translation",
    "result",
    "output",
    "content",
];

/// `data.outputs` of a workflow reply, or an empty map when absent.
pub(super) fn workflow_outputs(reply: &Value) -> Map<String, Value> {
    reply
        .get("data")
        .and_then(|data| data.get("outputs"))
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn field_names(outputs: &Map<String, Value>) -> Vec<String> {
    outputs.keys().cloned().collect()
}

fn non_empty_str<'a>(outputs: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    outputs
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

pub(super) fn extract_review(outputs: &Map<String, Value>) -> Result<String, RelayError> {
    std::iter::once("text")
        .chain(REVIEW_FALLBACK_FIELDS)
        .find_map(|field| {
            non_empty_str(outputs, field).map(|value| {
                tracing::debug!("Contract review result taken from field '{}'", field);
                value.to_string()
            })
        })
        .ok_or_else(|| RelayError::EmptyResult {
            available: field_names(outputs),
        })
}

pub(super) fn extract_translation(outputs: &Map<String, Value>) -> Result<String, RelayError> {
    let found = match outputs.get("Translation") {
        Some(value) => value.as_str().map(str::to_string),
        None => TRANSLATION_FALLBACK_FIELDS
            .iter()
            .find_map(|field| non_empty_str(outputs, field))
            .or_else(|| {
                outputs
                    .values()
                    .filter_map(Value::as_str)
                    .find(|value| !value.trim().is_empty())
            })
            .map(str::to_string),
    };

    match found {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RelayError::EmptyResult {
            available: field_names(outputs),
        }),
    }
}
