//! Environment-backed settings provider.
//!
//! Every call re-reads the process environment, so a supervisor that
//! rewrites the variables (or an operator rotating keys) is picked up on the
//! next request.

use crate::config::{GatewaySettings, DEFAULT_BIND_ADDR};
use crate::traits::SettingsProvider;

/// Backend base URL variable.
pub const BACKEND_URL_VAR: &str = "CHATGATE_BACKEND_URL";
/// Primary API key variable.
pub const API_KEY_VAR: &str = "CHATGATE_API_KEY";
/// Comma-separated rotation list variable.
pub const API_KEYS_VAR: &str = "CHATGATE_API_KEYS";
/// Explicit hardened-mode switch.
pub const HARDENED_VAR: &str = "CHATGATE_HARDENED";
/// Deployment environment; `production` implies hardened mode.
pub const ENV_VAR: &str = "CHATGATE_ENV";
/// Listen address for the binary.
pub const BIND_VAR: &str = "CHATGATE_BIND";

/// Settings read from `CHATGATE_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings;

impl EnvSettings {
    /// Create a new environment-backed provider.
    pub fn new() -> Self {
        Self
    }

    /// Listen address from `CHATGATE_BIND`, or the default.
    pub fn bind_addr(&self) -> String {
        read_var(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    fn hardened() -> bool {
        let explicit = read_var(HARDENED_VAR)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let production = read_var(ENV_VAR)
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        explicit || production
    }
}

/// Non-empty value of an environment variable.
fn read_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SettingsProvider for EnvSettings {
    fn settings(&self) -> GatewaySettings {
        GatewaySettings {
            backend_base_url: read_var(BACKEND_URL_VAR),
            api_key: read_var(API_KEY_VAR),
            api_key_rotation: read_var(API_KEYS_VAR),
            hardened: Self::hardened(),
        }
    }
}
