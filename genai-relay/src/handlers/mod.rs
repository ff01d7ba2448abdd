//! Transport-independent handlers.
//!
//! Both the axum server and the function entry point translate their input
//! into a [`RelayRequest`], call [`generate::generate_text`] or
//! [`models::list_models`], and write back the [`RelayResponse`].

pub mod generate;
pub mod health;
pub mod models;

use axum::{
    Json,
    body::Bytes,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;

/// An incoming request, reduced to what the handlers inspect.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    pub method: Method,
    pub body: Bytes,
}

impl RelayRequest {
    pub fn new(method: Method, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            body: body.into(),
        }
    }
}

/// A handler result: status, extra headers and an optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RelayResponse {
    /// JSON response with `body`.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status,
                headers: HeaderMap::new(),
                body: Some(value),
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                AppError::InternalError(anyhow::anyhow!("Failed to serialize response: {}", e))
                    .into()
            }
        }
    }

    /// Response without a body.
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add `headers`, replacing any existing values.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }
}

impl From<AppError> for RelayResponse {
    fn from(err: AppError) -> Self {
        let (status, body) = err.status_and_body();
        RelayResponse::json(status, &body)
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        response.headers_mut().extend(self.headers);
        response
    }
}
