//! SSE (Server-Sent Events) stream decoding
//!
//! Decodes the chat backend's long-lived SSE body into discrete records.
//! SSE format consists of:
//! - `event: <name>` - event name line (defaults to `message`)
//! - `data: <payload>` - data payload line(s)
//! - Empty line - terminates the record
//! - Lines starting with `:` - comments (keep-alive, ignored)
//!
//! # Module structure
//! - `record` - Line and record types (SseLine, SseRecord)
//! - `decoder` - Rolling-buffer decoder (SseDecoder)
//! - `stream` - Async adapter over a response body (decode_records)

mod decoder;
mod record;
mod stream;

pub use decoder::SseDecoder;
pub use record::{parse_record, parse_sse_line, SseLine, SseRecord, DEFAULT_EVENT};
pub use stream::decode_records;
