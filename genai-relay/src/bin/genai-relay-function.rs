//! Serves a single invocation: reads the event from stdin and writes the
//! response to stdout. Logs go to stderr.

use genai_relay::config::{DeploymentForm, RelayConfig};
use genai_relay::function::{InvocationEvent, failure_response, handle_invocation};
use genai_relay::startup::AppState;
use service_core::observability::{LogSink, init_tracing};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let otlp_endpoint = std::env::var("OTLP_ENDPOINT").ok();
    init_tracing(
        "genai-relay-function",
        "info",
        otlp_endpoint.as_deref(),
        LogSink::Stderr,
    )?;

    let mut input = String::new();
    tokio::io::stdin().read_to_string(&mut input).await?;
    let event: InvocationEvent = serde_json::from_str(&input).map_err(|e| {
        tracing::error!("Invalid invocation event: {}", e);
        anyhow::anyhow!("Invalid invocation event: {}", e)
    })?;

    // Configuration problems are reported on the response, not by exiting.
    let response = match RelayConfig::load(DeploymentForm::Function).and_then(AppState::from_config)
    {
        Ok(state) => handle_invocation(&state, event).await,
        Err(e) => failure_response(e),
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&serde_json::to_vec(&response)?).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    Ok(())
}
