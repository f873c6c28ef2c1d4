//! Proxy request handler.
//!
//! One inbound request becomes exactly one outbound request. Nothing is
//! retried here, redirects are handed back to the client, and both bodies
//! are streamed rather than buffered.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method},
    response::Response,
};

use hyper::ext::ReasonPhrase;

use super::headers::{forwardable_request_headers, relayable_response_headers};
use super::server::PROXY_PREFIX;
use super::target::resolve_backend;
use crate::error::GatewayError;
use crate::traits::SettingsProvider;

/// Shared state for the proxy routes.
#[derive(Clone)]
pub struct GatewayState {
    /// Read once per request
    pub settings: Arc<dyn SettingsProvider>,
    /// Outbound client, redirects disabled
    pub client: reqwest::Client,
}

impl GatewayState {
    /// Build the state with an outbound client that never follows redirects.
    pub fn new(settings: Arc<dyn SettingsProvider>) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(GatewayError::Client)?;
        Ok(Self { settings, client })
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState").finish_non_exhaustive()
    }
}

/// Forward `/api/proxy/{path}` to `{backend}/{path}`, status line included.
pub async fn proxy_handler(
    State(state): State<GatewayState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, GatewayError> {
    let settings = state.settings.settings();
    let target = resolve_backend(&settings)?;
    let outbound_headers = forwardable_request_headers(&headers, settings.credential().as_ref())?;
    let path = uri
        .path()
        .strip_prefix(PROXY_PREFIX)
        .ok_or(GatewayError::InvalidPath)?;
    let url = target.url_for(path, uri.query())?;

    tracing::debug!(%method, path = %path, "proxying request");

    let mut request = state
        .client
        .request(method.clone(), url)
        .headers(outbound_headers);
    if method != Method::GET && method != Method::HEAD {
        request = request.body(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    let upstream = request.send().await.map_err(GatewayError::upstream)?;

    let status = upstream.status();
    let relayed = relayable_response_headers(upstream.headers());
    let reason = upstream.extensions().get::<ReasonPhrase>().cloned();
    tracing::debug!(%method, path = %path, status = status.as_u16(), "backend responded");

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = relayed;
    // Non-canonical HTTP/1 reason phrase from the backend
    if let Some(reason) = reason {
        response.extensions_mut().insert(reason);
    }
    Ok(response)
}
