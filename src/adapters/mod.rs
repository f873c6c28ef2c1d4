//! Concrete implementations of trait abstractions.
//!
//! # Adapters
//!
//! - [`ReqwestHttpClient`] - HTTP client using reqwest
//! - [`EnvSettings`] - Gateway settings re-read from the environment
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles:
//! - [`mock::MockHttpClient`] - Configurable streaming responses
//! - [`mock::StaticSettings`] - In-memory settings

pub mod env_settings;
pub mod mock;
pub mod reqwest_http;

pub use env_settings::EnvSettings;
pub use mock::{MockHttpClient, MockResponse, StaticSettings};
pub use reqwest_http::ReqwestHttpClient;
