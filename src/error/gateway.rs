//! Gateway (reverse proxy) errors.
//!
//! Configuration variants deliberately carry no data: the offending URL or
//! key must never reach a response body or a log line.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::category::ErrorCategory;

/// Body returned for every configuration failure.
pub const MISCONFIGURED_BODY: &str = "Proxy misconfigured";

/// Body returned for a proxied path that cannot be forwarded.
pub const INVALID_PATH_BODY: &str = "Invalid proxy path";

/// Body returned when the backend could not be reached.
pub const BAD_GATEWAY_BODY: &str = "Upstream request failed";

/// Errors raised while forwarding one request.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Hardened mode with no backend URL configured
    #[error("backend base URL is not configured")]
    MissingBackend,

    /// Backend URL does not parse or is not http(s)
    #[error("backend base URL is invalid")]
    InvalidBackend,

    /// Hardened mode with a loopback or any-interface backend
    #[error("backend base URL points at a local address")]
    LocalBackend,

    /// Credential contains bytes not allowed in a header value
    #[error("credential is not a valid header value")]
    InvalidCredential,

    /// Proxied path has a `.`/`..` segment or does not decode to UTF-8
    #[error("proxied path cannot be forwarded")]
    InvalidPath,

    /// Outbound HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Backend unreachable or the request failed before a response
    #[error("upstream request failed: {0}")]
    Upstream(#[source] reqwest::Error),

    /// Listener could not be bound or failed while serving
    #[error("gateway listener failed: {0}")]
    Listener(#[from] std::io::Error),
}

impl GatewayError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::MissingBackend
            | GatewayError::InvalidBackend
            | GatewayError::LocalBackend
            | GatewayError::InvalidCredential
            | GatewayError::Client(_)
            | GatewayError::Listener(_) => ErrorCategory::Configuration,
            GatewayError::Upstream(_) => ErrorCategory::Transport,
            GatewayError::InvalidPath => ErrorCategory::Client,
        }
    }

    /// Stable identifier for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::MissingBackend => "missing_backend",
            GatewayError::InvalidBackend => "invalid_backend",
            GatewayError::LocalBackend => "local_backend",
            GatewayError::InvalidCredential => "invalid_credential",
            GatewayError::InvalidPath => "invalid_path",
            GatewayError::Client(_) => "client_build",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::Listener(_) => "listener",
        }
    }

    /// Wrap a reqwest failure, stripping the URL so the backend address
    /// does not leak through error messages.
    pub fn upstream(err: reqwest::Error) -> Self {
        GatewayError::Upstream(err.without_url())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self.category() {
            ErrorCategory::Transport => {
                tracing::warn!(kind = self.kind(), error = %self, "proxy request failed");
                (StatusCode::BAD_GATEWAY, BAD_GATEWAY_BODY).into_response()
            }
            ErrorCategory::Client => {
                tracing::debug!(kind = self.kind(), "rejecting proxied path");
                (StatusCode::BAD_REQUEST, INVALID_PATH_BODY).into_response()
            }
            _ => {
                tracing::error!(kind = self.kind(), "refusing to proxy: gateway misconfigured");
                (StatusCode::INTERNAL_SERVER_ERROR, MISCONFIGURED_BODY).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_errors_map_to_generic_500() {
        for err in [
            GatewayError::MissingBackend,
            GatewayError::InvalidBackend,
            GatewayError::LocalBackend,
            GatewayError::InvalidCredential,
        ] {
            assert_eq!(err.category(), ErrorCategory::Configuration);
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_invalid_path_is_bad_request() {
        let err = GatewayError::InvalidPath;
        assert_eq!(err.category(), ErrorCategory::Client);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_kinds_are_distinct() {
        let kinds = [
            GatewayError::MissingBackend.kind(),
            GatewayError::InvalidBackend.kind(),
            GatewayError::LocalBackend.kind(),
            GatewayError::InvalidCredential.kind(),
            GatewayError::InvalidPath.kind(),
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().collect();
        assert_eq!(unique.len(), kinds.len());
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use");
        let err: GatewayError = io.into();
        assert!(matches!(err, GatewayError::Listener(_)));
    }
}
