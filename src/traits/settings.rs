//! Settings provider trait abstraction.
//!
//! The gateway asks its provider for a fresh [`GatewaySettings`] snapshot on
//! every request instead of caching configuration at startup.

use std::sync::Arc;

use crate::config::GatewaySettings;

/// Source of gateway configuration.
///
/// Implementations include [`EnvSettings`](crate::adapters::EnvSettings),
/// which re-reads the process environment, and
/// [`StaticSettings`](crate::adapters::mock::StaticSettings) for tests and
/// embedding.
pub trait SettingsProvider: Send + Sync {
    /// Current settings. Called once per proxied request.
    fn settings(&self) -> GatewaySettings;
}

impl<T: SettingsProvider + ?Sized> SettingsProvider for Arc<T> {
    fn settings(&self) -> GatewaySettings {
        (**self).settings()
    }
}

impl SettingsProvider for GatewaySettings {
    fn settings(&self) -> GatewaySettings {
        self.clone()
    }
}
