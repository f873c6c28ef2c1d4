//! Gateway configuration types.
//!
//! Settings are read through a [`SettingsProvider`](crate::traits::SettingsProvider)
//! on every inbound request, so rotating the API key or repointing the
//! backend takes effect without a restart.

use std::fmt;

/// Header the resolved server-side credential is injected under.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Backend used outside hardened mode when none is configured.
pub const DEV_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default listen address for the gateway binary.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";

/// A server-side secret. Never logged: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for placing on the outbound request.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Resolve the credential for one request.
///
/// The primary value wins when non-empty; otherwise the first non-empty
/// entry of the comma-separated rotation list is used.
pub fn resolve_credential(primary: Option<&str>, rotation: Option<&str>) -> Option<Credential> {
    primary
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .or_else(|| {
            rotation?
                .split(',')
                .map(str::trim)
                .find(|key| !key.is_empty())
        })
        .map(Credential::new)
}

/// Configuration snapshot for one proxied request.
///
/// # Example
///
/// ```ignore
/// use chatgate::config::GatewaySettings;
///
/// let settings = GatewaySettings::new()
///     .with_backend_base_url("https://chat-backend.internal")
///     .with_api_key_rotation("key-new,key-old")
///     .with_hardened(true);
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct GatewaySettings {
    /// Backend base URL, may include a path prefix
    pub backend_base_url: Option<String>,
    /// Primary API key
    pub api_key: Option<String>,
    /// Comma-separated fallback keys, first non-empty wins
    pub api_key_rotation: Option<String>,
    /// Refuse unset or local backends
    pub hardened: bool,
}

impl GatewaySettings {
    /// Create empty settings (development mode, no credential).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL.
    pub fn with_backend_base_url(mut self, url: impl Into<String>) -> Self {
        self.backend_base_url = Some(url.into());
        self
    }

    /// Set the primary API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the comma-separated rotation list.
    pub fn with_api_key_rotation(mut self, keys: impl Into<String>) -> Self {
        self.api_key_rotation = Some(keys.into());
        self
    }

    /// Enable or disable hardened mode.
    pub fn with_hardened(mut self, hardened: bool) -> Self {
        self.hardened = hardened;
        self
    }

    /// Credential to inject, if one resolves.
    pub fn credential(&self) -> Option<Credential> {
        resolve_credential(self.api_key.as_deref(), self.api_key_rotation.as_deref())
    }
}

impl fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("backend_base_url", &self.backend_base_url)
            .field("has_credential", &self.credential().is_some())
            .field("hardened", &self.hardened)
            .finish()
    }
}
