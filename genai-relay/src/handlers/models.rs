use super::{RelayRequest, RelayResponse};
use crate::cors::CorsPolicy;
use crate::models::{ErrorEnvelope, catalog};
use crate::services::GenerativeProvider;
use axum::http::{Method, StatusCode};
use service_core::error::AppError;

/// `GET /models`: list upstream models as descriptors.
///
/// `OPTIONS` is answered as a preflight with an empty 200. Under a restricted
/// CORS policy every response carries the allow-list headers.
pub async fn list_models(
    provider: &dyn GenerativeProvider,
    cors: &CorsPolicy,
    request: RelayRequest,
) -> RelayResponse {
    let response = match request.method {
        Method::OPTIONS => RelayResponse::empty(StatusCode::OK),
        Method::GET => fetch_descriptors(provider).await,
        _ => AppError::MethodNotAllowed.into(),
    };

    response.with_headers(cors.models_headers())
}

async fn fetch_descriptors(provider: &dyn GenerativeProvider) -> RelayResponse {
    match provider.list_models().await {
        Ok(records) => RelayResponse::json(StatusCode::OK, &catalog::project(records)),
        Err(err) => {
            tracing::error!(error = %err, "Error listing models");
            RelayResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorEnvelope::list_models_failure(&err),
            )
        }
    }
}
