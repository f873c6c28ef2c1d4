//! In-memory settings provider.
//!
//! Shared and swappable, so a test can rotate the key or repoint the backend
//! while a gateway is running and observe the next request pick it up.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::GatewaySettings;
use crate::traits::SettingsProvider;

/// Settings held in memory behind a shared lock.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    inner: Arc<RwLock<GatewaySettings>>,
}

impl StaticSettings {
    /// Create a provider starting from `settings`.
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Replace the settings seen by subsequent requests.
    pub fn set(&self, settings: GatewaySettings) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    /// Modify the settings in place.
    pub fn update(&self, f: impl FnOnce(&mut GatewaySettings)) {
        f(&mut self.inner.write().unwrap_or_else(PoisonError::into_inner));
    }
}

impl SettingsProvider for StaticSettings {
    fn settings(&self) -> GatewaySettings {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;

    #[test]
    fn test_clones_share_state() {
        let provider = StaticSettings::new(GatewaySettings::new().with_api_key("k1"));
        let handle = provider.clone();

        handle.update(|s| s.api_key = Some("k2".to_string()));
        assert_eq!(provider.settings().credential(), Some(Credential::new("k2")));

        handle.set(GatewaySettings::new());
        assert_eq!(provider.settings().credential(), None);
    }
}
