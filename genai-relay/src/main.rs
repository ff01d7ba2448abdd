use genai_relay::config::{DeploymentForm, RelayConfig};
use genai_relay::startup::Application;
use service_core::observability::{LogSink, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing("genai-relay", "info", otlp_endpoint.as_deref(), LogSink::Stdout)?;

    let config = RelayConfig::load(DeploymentForm::Server).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        tracing::error!(
            "Set GEMINI_API_KEY in the environment or in a .env file next to the binary"
        );
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    app.run_until_stopped().await?;

    Ok(())
}
