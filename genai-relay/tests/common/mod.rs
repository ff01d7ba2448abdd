#![allow(dead_code)]

use genai_relay::config::{GoogleConfig, ModelConfig, RelayConfig};
use genai_relay::cors::CorsPolicy;
use genai_relay::services::GenerativeProvider;
use genai_relay::services::providers::ProviderKind;
use genai_relay::startup::{AppState, Application};
use secrecy::Secret;
use service_core::config::Config;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-2.5-flash";

pub fn test_config(cors: CorsPolicy, api_base: &str) -> RelayConfig {
    RelayConfig {
        common: Config {
            host: "127.0.0.1".parse().unwrap(),
            port: 0, // Random port
        },
        provider: ProviderKind::Gemini,
        google: GoogleConfig {
            api_key: Secret::new(TEST_API_KEY.to_string()),
            api_base: api_base.to_string(),
            request_timeout: Duration::from_secs(5),
        },
        models: ModelConfig {
            text_model: TEST_MODEL.to_string(),
        },
        cors,
    }
}

pub fn test_state(cors: CorsPolicy, provider: Arc<dyn GenerativeProvider>) -> AppState {
    AppState::new(test_config(cors, "http://127.0.0.1:1"), provider)
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the server on a random port with `provider` behind it.
    pub async fn spawn(provider: Arc<dyn GenerativeProvider>) -> Self {
        let app = Application::with_state(test_state(CorsPolicy::Permissive, provider))
            .await
            .expect("Failed to build application");

        let port = app.port();
        tokio::spawn(async move {
            let _ = app.run_until_stopped().await;
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            port,
        }
    }
}
