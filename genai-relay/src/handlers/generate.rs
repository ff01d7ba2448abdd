use super::{RelayRequest, RelayResponse};
use crate::models::{ErrorEnvelope, GenerationRequest, GenerationResult};
use crate::services::GenerativeProvider;
use axum::http::{Method, StatusCode};
use service_core::error::AppError;

/// `POST /generate`: forward the prompt and return the generated text.
///
/// Invalid requests are answered without touching the provider. Provider
/// failures are normalized into an [`ErrorEnvelope`] with a 500.
pub async fn generate_text(
    provider: &dyn GenerativeProvider,
    request: RelayRequest,
) -> RelayResponse {
    if request.method != Method::POST {
        return AppError::MethodNotAllowed.into();
    }

    let generation = match GenerationRequest::from_body(&request.body) {
        Ok(generation) => generation,
        Err(err) => {
            tracing::warn!(error = %err, "Rejected generation request");
            return err.into();
        }
    };

    match provider.generate(&generation.prompt).await {
        Ok(generated_text) => {
            RelayResponse::json(StatusCode::OK, &GenerationResult { generated_text })
        }
        Err(err) => {
            tracing::error!(error = %err, "Error calling upstream generation API");
            RelayResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorEnvelope::from_upstream(&err),
            )
        }
    }
}
