//! Application startup and lifecycle management for the persistent server.

use crate::config::RelayConfig;
use crate::handlers::{self, RelayRequest, RelayResponse, health::health_check};
use crate::services::GenerativeProvider;
use crate::services::providers::ProviderKind;
use crate::services::providers::gemini::{GeminiConfig, GeminiProvider};
use crate::services::providers::mock::MockProvider;
use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::Method,
    middleware::from_fn,
    routing::{any, get},
};
use service_core::error::AppError;
use service_core::middleware::tracing::{make_request_span, request_id_middleware};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub provider: Arc<dyn GenerativeProvider>,
}

impl AppState {
    pub fn new(config: RelayConfig, provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { config, provider }
    }

    /// State with the provider selected by `config`.
    pub fn from_config(config: RelayConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config)?;
        Ok(Self::new(config, provider))
    }
}

/// Construct the configured upstream provider.
pub fn build_provider(config: &RelayConfig) -> Result<Arc<dyn GenerativeProvider>, AppError> {
    let provider: Arc<dyn GenerativeProvider> = match config.provider {
        ProviderKind::Gemini => {
            let gemini = GeminiProvider::new(GeminiConfig {
                api_key: config.google.api_key.clone(),
                model: config.models.text_model.clone(),
                api_base: config.google.api_base.clone(),
                timeout: config.google.request_timeout,
            })
            .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;
            Arc::new(gemini)
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock provider; responses are canned");
            Arc::new(MockProvider::new())
        }
    };

    tracing::info!(
        provider = %config.provider,
        model = %config.models.text_model,
        "Initialized generative provider"
    );

    Ok(provider)
}

async fn generate(State(state): State<AppState>, method: Method, body: Bytes) -> RelayResponse {
    handlers::generate::generate_text(state.provider.as_ref(), RelayRequest::new(method, body))
        .await
}

async fn models(State(state): State<AppState>, method: Method, body: Bytes) -> RelayResponse {
    handlers::models::list_models(
        state.provider.as_ref(),
        &state.config.cors,
        RelayRequest::new(method, body),
    )
    .await
}

/// Routes, CORS, request ids and request spans.
pub fn build_router(state: AppState) -> Router {
    let cors = state.config.cors.layer();

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/generate", any(generate))
        .route("/models", any(models))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state);

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RelayConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config)?;
        Self::with_state(state).await
    }

    /// Build around an existing state, e.g. one holding a test provider.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        // port 0 = random port for testing
        let addr = state.config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("GenAI relay listening at http://localhost:{}", port);
        tracing::info!("   API endpoint for chat: http://localhost:{}/generate", port);
        tracing::info!("   Model list:            http://localhost:{}/models", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                e
            })
    }
}
