//! Mock provider for tests and offline runs.

use super::{GenerativeProvider, ProviderError};
use crate::models::ModelRecord;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Canned-response provider that counts its calls.
///
/// By default `generate` echoes the prompt and `list_models` returns a single
/// model.
pub struct MockProvider {
    generate_outcome: Option<Result<String, ProviderError>>,
    list_outcome: Result<Vec<ModelRecord>, ProviderError>,
    generate_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            generate_outcome: None,
            list_outcome: Ok(vec![ModelRecord {
                name: Some("models/mock-model".to_string()),
                display_name: Some("Mock Model".to_string()),
                supported_generation_methods: Some(vec!["generateContent".to_string()]),
                input_token_limit: Some(32_768),
                output_token_limit: Some(8_192),
                version: Some("001".to_string()),
                ..Default::default()
            }]),
            generate_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Always answer `generate` with `text`.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.generate_outcome = Some(Ok(text.into()));
        self
    }

    /// Always fail `generate` with `err`.
    pub fn with_generate_error(mut self, err: ProviderError) -> Self {
        self.generate_outcome = Some(Err(err));
        self
    }

    /// Answer `list_models` with `models`.
    pub fn with_models(mut self, models: Vec<ModelRecord>) -> Self {
        self.list_outcome = Ok(models);
        self
    }

    /// Always fail `list_models` with `err`.
    pub fn with_list_error(mut self, err: ProviderError) -> Self {
        self.list_outcome = Err(err);
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);

        match &self.generate_outcome {
            Some(outcome) => outcome.clone(),
            None => Ok(format!("Mock response for: {}", prompt)),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_outcome.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_prompt_by_default() {
        let provider = MockProvider::new();

        assert_eq!(
            provider.generate("ping").await.unwrap(),
            "Mock response for: ping"
        );
        assert_eq!(provider.generate_calls(), 1);
        assert_eq!(provider.list_calls(), 0);
    }

    #[tokio::test]
    async fn configured_errors_are_returned_every_time() {
        let provider =
            MockProvider::new().with_list_error(ProviderError::Upstream("down".to_string()));

        for _ in 0..2 {
            assert_eq!(
                provider.list_models().await.unwrap_err(),
                ProviderError::Upstream("down".to_string())
            );
        }
        assert_eq!(provider.list_calls(), 2);
    }
}
