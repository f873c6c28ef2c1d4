//! Chat call client.
//!
//! - `events` - Typed events (`ChatStreamEvent`, `ChatMeta`)
//! - `payloads` - JSON payload classification
//! - `interpreter` - SSE record to event mapping
//! - `request` - Request body
//! - `client` - Streaming call, observer, request-id correlation
//! - `session` - Caller-owned session state, transcript, retry

mod client;
mod events;
mod interpreter;
mod payloads;
mod request;
mod session;

pub use client::{
    extract_request_id, ChatClient, ChatObserver, ChatReply, ChatStream, CHAT_STREAM_PATH,
    REQUEST_ID_HEADER,
};
pub use events::{ChatMeta, ChatStreamEvent, Source};
pub use interpreter::{interpret_records, ChatInterpreter, META_EVENT};
pub use payloads::{parse_meta, MessagePayload, DONE_SENTINEL};
pub use request::ChatRequest;
pub use session::{ChatSession, Conversation, Role, Turn, TurnStatus};
