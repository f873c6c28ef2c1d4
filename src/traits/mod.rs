//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - Streaming HTTP POST used by the chat client
//! - [`SettingsProvider`] - Per-request gateway configuration

pub mod http;
pub mod settings;

pub use http::{header_value, ByteStream, Headers, HttpClient, HttpError, StreamingResponse};
pub use settings::SettingsProvider;
