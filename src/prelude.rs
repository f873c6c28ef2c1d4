//! Prelude module for convenient imports.
//!
//! ```ignore
//! use chatgate::prelude::*;
//! ```

// Chat client
pub use crate::chat::{
    ChatClient, ChatMeta, ChatObserver, ChatReply, ChatRequest, ChatSession, ChatStream,
    ChatStreamEvent, Conversation, Source, Turn, TurnStatus,
};

// Gateway
pub use crate::config::{Credential, GatewaySettings};
pub use crate::gateway::{serve, start_gateway_on, GatewayState};

// Errors
pub use crate::error::{ChatError, ChatResult, ErrorCategory, GatewayError};

// Seams and adapters
pub use crate::adapters::{EnvSettings, ReqwestHttpClient};
pub use crate::traits::{HttpClient, SettingsProvider};

// Decoding
pub use crate::sse::{SseDecoder, SseRecord};
