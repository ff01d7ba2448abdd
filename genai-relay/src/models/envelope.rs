//! Normalization of upstream failures into the client-facing error envelope.
//!
//! Precedence, first match wins:
//! 1. response payload with a nested `error` value: its `message` and the
//!    nested value itself as `fullError`
//! 2. response payload without a nested error: the payload serialized as JSON
//! 3. a plain error message
//! 4. a fixed fallback

use crate::services::providers::ProviderError;
use serde::Serialize;
use serde_json::{Map, Value};

/// `error` field of every generation failure.
pub const GENERIC_ERROR: &str = "Error processing your request";

/// `details` when nothing more specific is available.
pub const UNEXPECTED_ERROR_DETAILS: &str = "An unexpected server error occurred.";

/// `error` field of model listing failures.
pub const LIST_MODELS_ERROR: &str = "Failed to list models";

/// `details` of a model listing failure without a message.
pub const LIST_MODELS_FALLBACK_DETAILS: &str = "An unknown error occurred while listing models.";

/// Error body returned with a 500 when an upstream call fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_error: Option<Value>,
}

/// Which branch of the normalization an error falls into.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureShape<'a> {
    NestedError(&'a Value),
    Payload(&'a Value),
    Message(String),
    Opaque,
}

impl<'a> FailureShape<'a> {
    pub fn of(err: &'a ProviderError) -> Self {
        if let Some(payload) = err.response_payload().filter(|p| is_truthy(p)) {
            return match payload.get("error").filter(|nested| is_truthy(nested)) {
                Some(nested) => FailureShape::NestedError(nested),
                None => FailureShape::Payload(payload),
            };
        }

        match err.message().filter(|m| !m.is_empty()) {
            Some(message) => FailureShape::Message(message),
            None => FailureShape::Opaque,
        }
    }
}

impl ErrorEnvelope {
    /// Envelope for a failed generation call.
    pub fn from_upstream(err: &ProviderError) -> Self {
        let (details, full_error) = match FailureShape::of(err) {
            FailureShape::NestedError(nested) => {
                let details = nested
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .unwrap_or(UNEXPECTED_ERROR_DETAILS)
                    .to_string();
                (details, nested.clone())
            }
            FailureShape::Payload(payload) => (payload.to_string(), empty_object()),
            FailureShape::Message(message) => (message, empty_object()),
            FailureShape::Opaque => (UNEXPECTED_ERROR_DETAILS.to_string(), empty_object()),
        };

        Self {
            error: GENERIC_ERROR.to_string(),
            details,
            full_error: Some(full_error),
        }
    }

    /// Envelope for a failed model listing. Carries no `fullError`.
    pub fn list_models_failure(err: &ProviderError) -> Self {
        Self {
            error: LIST_MODELS_ERROR.to_string(),
            details: err
                .message()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| LIST_MODELS_FALLBACK_DETAILS.to_string()),
            full_error: None,
        }
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
