//! Gemini AI provider implementation.
//!
//! Calls the Generative Language REST API (`generateContent` and the model
//! listing endpoint). Non-success responses keep their body as the error
//! payload so it can be normalized for clients.

use super::{GenerativeProvider, ProviderError};
use crate::models::ModelRecord;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::collections::HashSet;
use std::time::Duration;

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Finish reasons that mean the candidate text must not be returned.
const BLOCKING_FINISH_REASONS: [&str; 3] = ["SAFETY", "RECITATION", "LANGUAGE"];

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini text provider.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Build the API URL for a resource path below the base.
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Model resource name, accepting both `gemini-x` and `models/gemini-x`.
    fn model_path(&self) -> String {
        let model = self.config.model.trim_start_matches("models/");
        format!("models/{}", model)
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let url = self.api_url(&format!("{}:generateContent", self.model_path()));

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .traced_post(&url)
            .header(API_KEY_HEADER, self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let response = check_status(response).await?;

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        api_response.text()
    }

    async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError> {
        let url = self.api_url("models");
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();

        loop {
            let mut request = self
                .client
                .traced_get(&url)
                .header(API_KEY_HEADER, self.config.api_key.expose_secret());
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

            let response = check_status(response).await?;

            let page: ListModelsResponse = response.json().await.map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse model list: {}", e))
            })?;

            models.extend(page.models);

            let Some(next) = page.next_page_token.filter(|t| !t.is_empty()) else {
                break;
            };
            if !seen_tokens.insert(next.clone()) {
                tracing::warn!(page_token = %next, "Model listing revisited a page; stopping");
                break;
            }
            page_token = Some(next);
        }

        tracing::debug!(count = models.len(), "Listed Gemini models");

        Ok(models)
    }
}

/// Turn a non-success response into [`ProviderError::Api`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let payload = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));

    let message = payload
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });

    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
        payload,
    })
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelRecord>,
    #[serde(default)]
    next_page_token: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all text parts concatenated.
    ///
    /// Prompt feedback without candidates means the prompt was blocked, and
    /// a blocked candidate is an error too. A response with neither yields
    /// empty text.
    fn text(self) -> Result<String, ProviderError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return match self.prompt_feedback {
                Some(PromptFeedback {
                    block_reason: Some(reason),
                }) => Err(ProviderError::ContentFiltered(format!(
                    "Text not available. Response was blocked due to {}",
                    reason
                ))),
                Some(_) => Err(ProviderError::ContentFiltered(
                    "Text not available. Response was blocked".to_string(),
                )),
                None => Ok(String::new()),
            };
        };

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|r| BLOCKING_FINISH_REASONS.contains(r))
        {
            return Err(ProviderError::ContentFiltered(format!(
                "Candidate was blocked due to {}",
                reason
            )));
        }

        Ok(candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect())
    }
}
