//! Per-invocation entry point.
//!
//! A hosting platform hands the process one HTTP event and expects one
//! response back. Routing is by path; the work is done by the same handlers
//! the persistent server uses.

use crate::handlers::{self, RelayRequest, RelayResponse};
use crate::startup::AppState;
use axum::http::Method;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use service_core::error::AppError;
use std::collections::{BTreeMap, HashMap};
use tracing::Instrument;

/// An incoming invocation event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEvent {
    pub http_method: String,
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
}

/// Gateways send `null` for empty fields as well as omitting them.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The response written back to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<RelayResponse> for InvocationResponse {
    fn from(response: RelayResponse) -> Self {
        let mut headers: BTreeMap<String, String> = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = match response.body {
            Some(body) => {
                headers.insert("content-type".to_string(), "application/json".to_string());
                body.to_string()
            }
            None => String::new(),
        };

        Self {
            status_code: response.status.as_u16(),
            headers,
            body,
        }
    }
}

/// Which relay operation a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Generate,
    Models,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "/generate" | "/api/generate" => Some(Route::Generate),
            "/models" | "/api/models" => Some(Route::Models),
            _ => None,
        }
    }
}

/// Handle one invocation.
pub async fn handle_invocation(state: &AppState, event: InvocationEvent) -> InvocationResponse {
    let span = tracing::info_span!(
        "invocation",
        method = %event.http_method,
        path = %event.path,
        request_id = event
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("x-request-id"))
            .map(|(_, value)| value.as_str())
            .unwrap_or("-"),
    );

    let response = dispatch(state, event).instrument(span.clone()).await;

    let _guard = span.enter();
    let mut response = InvocationResponse::from(response);
    for (name, value) in state.config.cors.global_headers() {
        if let Ok(value) = value.to_str() {
            response
                .headers
                .insert(name.as_str().to_string(), value.to_string());
        }
    }

    tracing::info!(status = response.status_code, "Invocation finished");
    response
}

async fn dispatch(state: &AppState, event: InvocationEvent) -> RelayResponse {
    let Some(route) = Route::from_path(&event.path) else {
        return AppError::NotFound(anyhow::anyhow!("Not found")).into();
    };

    let Ok(method) = Method::from_bytes(event.http_method.to_ascii_uppercase().as_bytes()) else {
        return AppError::MethodNotAllowed.into();
    };

    let body = match decode_body(event.body, event.is_base64_encoded) {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(error = %err, "Invocation body is not valid base64");
            return err.into();
        }
    };

    let request = RelayRequest::new(method, body);
    let provider = state.provider.as_ref();

    match route {
        Route::Generate => handlers::generate::generate_text(provider, request).await,
        Route::Models => handlers::models::list_models(provider, &state.config.cors, request).await,
    }
}

fn decode_body(body: Option<String>, is_base64_encoded: bool) -> Result<Vec<u8>, AppError> {
    let body = body.unwrap_or_default();
    if !is_base64_encoded {
        return Ok(body.into_bytes());
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Invalid base64 body: {}", e)))
}

/// Response for an invocation that could not be served at all, e.g. when the
/// configuration failed to load.
pub fn failure_response(err: AppError) -> InvocationResponse {
    tracing::error!(error = %err, "Invocation failed before dispatch");
    InvocationResponse::from(RelayResponse::from(err))
}
