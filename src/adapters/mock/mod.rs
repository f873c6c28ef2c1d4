//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client replaying canned SSE chunks
//! - [`StaticSettings`] - In-memory, swappable gateway settings

pub mod http;
pub mod settings;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use settings::StaticSettings;
