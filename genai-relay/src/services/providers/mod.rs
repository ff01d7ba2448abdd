//! Upstream generative-language providers.
//!
//! Handlers only see [`GenerativeProvider`], so the Gemini backend can be
//! swapped for the mock in tests and offline runs.

pub mod gemini;
pub mod mock;

use crate::models::ModelRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with a non-success status.
    #[error("Upstream API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        /// Parsed JSON body, or the raw body text when it was not JSON.
        payload: Value,
    },

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown provider error")]
    Unknown,
}

impl ProviderError {
    /// The upstream response body, when the provider returned one.
    pub fn response_payload(&self) -> Option<&Value> {
        match self {
            ProviderError::Api { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Human-readable message, if the failure has one.
    pub fn message(&self) -> Option<String> {
        match self {
            ProviderError::Unknown => None,
            other => Some(other.to_string()),
        }
    }
}

/// Text generation and model listing against an upstream service.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    /// List every model the upstream exposes, in upstream order.
    async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError>;
}

/// Which [`GenerativeProvider`] backs the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => f.write_str("gemini"),
            ProviderKind::Mock => f.write_str("mock"),
        }
    }
}
