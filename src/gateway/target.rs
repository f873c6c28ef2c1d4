//! Backend target resolution and outbound URL construction.

use std::net::IpAddr;

use reqwest::Url;

use crate::config::{GatewaySettings, DEV_BACKEND_URL};
use crate::error::GatewayError;

/// Validated backend base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendTarget {
    base: Url,
}

/// Pick the backend for one request.
///
/// Hardened mode refuses an unset base URL and any loopback or
/// any-interface host. Otherwise an unset URL falls back to the local
/// development backend.
pub fn resolve_backend(settings: &GatewaySettings) -> Result<BackendTarget, GatewayError> {
    let configured = settings
        .backend_base_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());

    let raw = match configured {
        Some(url) => url,
        None if settings.hardened => return Err(GatewayError::MissingBackend),
        None => DEV_BACKEND_URL,
    };

    let mut url = Url::parse(raw).map_err(|_| GatewayError::InvalidBackend)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(GatewayError::InvalidBackend);
    }
    if settings.hardened && is_local_host(&url) {
        return Err(GatewayError::LocalBackend);
    }

    url.set_query(None);
    url.set_fragment(None);
    Ok(BackendTarget { base: url })
}

/// True for `localhost`, `*.localhost`, loopback and unspecified addresses.
fn is_local_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost") {
        return true;
    }

    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Ok(IpAddr::V6(ip)) => {
            ip.is_loopback()
                || ip.is_unspecified()
                || ip
                    .to_ipv4_mapped()
                    .is_some_and(|v4| v4.is_loopback() || v4.is_unspecified())
        }
        Err(_) => false,
    }
}

impl BackendTarget {
    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Outbound URL for a proxied path.
    ///
    /// `raw_path` is the path as received, still percent-encoded. Every
    /// segment is decoded and pushed as exactly one segment below the base
    /// path, so an encoded `/` stays inside its segment. `.` and `..`
    /// segments are refused. The query string is appended as received.
    pub fn url_for(&self, raw_path: &str, query: Option<&str>) -> Result<Url, GatewayError> {
        let segments = raw_path
            .trim_start_matches('/')
            .split('/')
            .map(decode_segment)
            .collect::<Result<Vec<_>, _>>()?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidBackend)?
            .pop_if_empty()
            .extend(&segments);
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }
}

fn decode_segment(raw: &str) -> Result<String, GatewayError> {
    let decoded = urlencoding::decode(raw).map_err(|_| GatewayError::InvalidPath)?;
    if decoded == "." || decoded == ".." {
        return Err(GatewayError::InvalidPath);
    }
    Ok(decoded.into_owned())
}
