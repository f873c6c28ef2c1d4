//! Error handling for the gateway and the chat client.
//!
//! | Category | Raised by | Surfaced | Retryable |
//! |----------|-----------|----------|-----------|
//! | Configuration | gateway target/credential checks | generic 500 | No |
//! | Transport | non-2xx initial response, I/O | caller | Yes |
//! | Protocol | malformed SSE framing | absorbed | - |
//! | Payload | undecodable JSON | absorbed | - |
//! | Application | `error` payload in stream | caller | Yes |
//! | Cancelled | caller abandoned the call | caller | No |
//! | Client | API misuse, unforwardable proxy path (400) | caller | No |

mod category;
mod chat;
mod gateway;

pub use category::ErrorCategory;
pub use chat::{ChatError, ChatResult};
pub use gateway::{GatewayError, BAD_GATEWAY_BODY, INVALID_PATH_BODY, MISCONFIGURED_BODY};
