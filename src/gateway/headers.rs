//! Header filtering at the trust boundary.
//!
//! Inbound headers are copied by allow-list only. Anything else the browser
//! sends, including cookies and its own `X-API-Key`, never reaches the
//! backend.

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION};

use crate::config::{Credential, API_KEY_HEADER};
use crate::error::GatewayError;

/// Request headers copied from the client to the backend.
pub const FORWARDED_REQUEST_HEADERS: [&str; 6] = [
    "accept",
    "accept-language",
    "content-type",
    "user-agent",
    "x-user-email",
    "x-request-id",
];

/// Connection-scoped headers never relayed back to the client.
pub const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| hop.eq_ignore_ascii_case(name))
}

/// Build the outbound header set for one proxied request.
///
/// Only allow-listed headers are copied. When a credential resolves it is
/// set under `X-API-Key`, marked sensitive.
pub fn forwardable_request_headers(
    inbound: &HeaderMap,
    credential: Option<&Credential>,
) -> Result<HeaderMap, GatewayError> {
    let mut outbound = HeaderMap::new();

    for name in FORWARDED_REQUEST_HEADERS {
        for value in inbound.get_all(name) {
            outbound.append(HeaderName::from_static(name), value.clone());
        }
    }

    if let Some(credential) = credential {
        let mut value = HeaderValue::from_str(credential.expose())
            .map_err(|_| GatewayError::InvalidCredential)?;
        value.set_sensitive(true);
        outbound.insert(HeaderName::from_static(API_KEY_HEADER), value);
    }

    Ok(outbound)
}

/// Copy backend response headers, dropping hop-by-hop headers and any
/// header the backend named in its own `Connection` header.
pub fn relayable_response_headers(upstream: &HeaderMap) -> HeaderMap {
    let connection_scoped: Vec<String> = upstream
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    let mut relayed = HeaderMap::new();
    for (name, value) in upstream {
        let name_str = name.as_str();
        if is_hop_by_hop(name_str) || connection_scoped.iter().any(|n| n == name_str) {
            continue;
        }
        relayed.append(name.clone(), value.clone());
    }
    relayed
}
