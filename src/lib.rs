//! chatgate - streaming chat gateway
//!
//! Two halves share this crate:
//!
//! - [`gateway`]: a reverse proxy that forwards browser API calls to the
//!   chat backend, enforcing a header allow-list and injecting the
//!   server-side API key.
//! - [`chat`]: a client that turns the backend's SSE response into typed
//!   [`ChatStreamEvent`](chat::ChatStreamEvent)s, with request-id
//!   correlation and retry-as-fresh-call.

pub mod adapters;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod prelude;
pub mod sse;
pub mod traits;
