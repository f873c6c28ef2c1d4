//! Credential-enforcing reverse proxy.
//!
//! Forwards `/api/proxy/{path}` to the configured backend. Request headers
//! pass through an allow-list, the server-side API key is injected, and
//! hop-by-hop response headers are dropped. Settings are re-read on every
//! request.

mod handler;
mod headers;
mod server;
mod target;

pub use handler::{proxy_handler, GatewayState};
pub use headers::{
    forwardable_request_headers, is_hop_by_hop, relayable_response_headers,
    FORWARDED_REQUEST_HEADERS, HOP_BY_HOP_HEADERS,
};
pub use server::{router, serve, start_gateway_on, PROXY_PREFIX};
pub use target::{resolve_backend, BackendTarget};
