//! Cross-origin policy for the relay endpoints.

use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, header};
use service_core::error::AppError;
use tower_http::cors::{AllowHeaders, Any, CorsLayer};

/// How cross-origin requests are answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsPolicy {
    /// Any origin, on every route, handled by the transport.
    Permissive,
    /// A single trusted origin, announced on `/models` responses.
    Restricted(HeaderValue),
    /// No CORS headers at all.
    Disabled,
}

impl CorsPolicy {
    /// Parse a `RELAY_CORS_ORIGIN` value.
    ///
    /// `*` is permissive, `none` disables CORS, anything else is taken as the
    /// single allowed origin. Unset or empty falls back to `default`.
    pub fn parse(value: Option<&str>, default: CorsPolicy) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") => Ok(default),
            Some("*") => Ok(CorsPolicy::Permissive),
            Some(v) if v.eq_ignore_ascii_case("none") => Ok(CorsPolicy::Disabled),
            Some(origin) => HeaderValue::from_str(origin)
                .map(CorsPolicy::Restricted)
                .map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "RELAY_CORS_ORIGIN '{}' is not a valid origin: {}",
                        origin,
                        e
                    ))
                }),
        }
    }

    /// Headers every `/models` response carries under this policy.
    pub fn models_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let CorsPolicy::Restricted(origin) = self {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            );
        }
        headers
    }

    /// Headers a transport without a CORS layer adds to every response.
    pub fn global_headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        match self {
            CorsPolicy::Permissive => vec![(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            )],
            _ => Vec::new(),
        }
    }

    /// Layer for the persistent server, when the policy is permissive.
    ///
    /// Mirrors requested headers and allows the common methods for any origin.
    pub fn layer(&self) -> Option<CorsLayer> {
        match self {
            CorsPolicy::Permissive => Some(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([
                        Method::GET,
                        Method::HEAD,
                        Method::PUT,
                        Method::PATCH,
                        Method::POST,
                        Method::DELETE,
                    ])
                    .allow_headers(AllowHeaders::mirror_request()),
            ),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_uses_default() {
        assert_eq!(
            CorsPolicy::parse(None, CorsPolicy::Permissive).unwrap(),
            CorsPolicy::Permissive
        );
        assert_eq!(
            CorsPolicy::parse(Some(""), CorsPolicy::Disabled).unwrap(),
            CorsPolicy::Disabled
        );
    }

    #[test]
    fn parses_wildcard_none_and_origin() {
        assert_eq!(
            CorsPolicy::parse(Some("*"), CorsPolicy::Disabled).unwrap(),
            CorsPolicy::Permissive
        );
        assert_eq!(
            CorsPolicy::parse(Some("None"), CorsPolicy::Permissive).unwrap(),
            CorsPolicy::Disabled
        );
        assert_eq!(
            CorsPolicy::parse(Some("https://app.example.com"), CorsPolicy::Disabled).unwrap(),
            CorsPolicy::Restricted(HeaderValue::from_static("https://app.example.com"))
        );
    }

    #[test]
    fn rejects_origin_that_is_not_a_header_value() {
        assert!(CorsPolicy::parse(Some("https://a\nb"), CorsPolicy::Disabled).is_err());
    }

    #[test]
    fn restricted_policy_announces_origin_on_models() {
        let policy = CorsPolicy::Restricted(HeaderValue::from_static("https://app.example.com"));
        let headers = policy.models_headers();

        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert!(policy.layer().is_none());
        assert!(policy.global_headers().is_empty());
    }

    #[test]
    fn permissive_policy_uses_transport_headers_only() {
        assert!(CorsPolicy::Permissive.models_headers().is_empty());
        assert!(CorsPolicy::Permissive.layer().is_some());
        assert_eq!(CorsPolicy::Permissive.global_headers().len(), 1);
    }
}
