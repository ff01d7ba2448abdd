//! Text generation request and result.

use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;

/// Message returned when a generation request has no usable prompt.
pub const PROMPT_REQUIRED: &str = "Prompt is required in the request body.";

/// A validated generation request. `prompt` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
}

impl GenerationRequest {
    /// Parse a raw request body.
    ///
    /// The body must be a JSON object with a non-empty string `prompt`.
    /// Anything else (malformed JSON, missing field, `null`, `""`, numbers)
    /// is rejected with the same client error.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::debug!(error = %e, "Generation request body is not valid JSON");
            prompt_required()
        })?;

        match value.get("prompt") {
            Some(Value::String(prompt)) if !prompt.is_empty() => Ok(Self {
                prompt: prompt.clone(),
            }),
            _ => Err(prompt_required()),
        }
    }
}

fn prompt_required() -> AppError {
    AppError::BadRequest(anyhow::anyhow!(PROMPT_REQUIRED))
}

/// Successful generation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub generated_text: String,
}
