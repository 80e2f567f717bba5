//! Which headers cross the proxy between client and origin

use anyhow::{Context, Result};
use http::HeaderMap;
use http::header::CONNECTION;
use serde::Deserialize;

pub const HEADERS_ENV_VAR: &str = "EDGE_AUTH_BLOCKED_HEADERS";

/// Headers dropped when a message crosses the proxy, in either direction
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderForwardingConfig {
    /// Exact header names to drop (case-insensitive)
    pub blocked_headers: Vec<String>,

    /// Header prefixes to drop (e.g., "Proxy-")
    #[serde(default)]
    pub blocked_prefixes: Vec<String>,
}

impl Default for HeaderForwardingConfig {
    fn default() -> Self {
        Self {
            // hop-by-hop headers, plus the ones the proxy recomputes itself
            blocked_headers: vec![
                "Connection".to_string(),
                "Keep-Alive".to_string(),
                "Proxy-Authenticate".to_string(),
                "Proxy-Authorization".to_string(),
                "TE".to_string(),
                "Trailer".to_string(),
                "Transfer-Encoding".to_string(),
                "Upgrade".to_string(),
                "Host".to_string(),
                "Content-Length".to_string(),
            ],
            blocked_prefixes: vec![],
        }
    }
}

impl HeaderForwardingConfig {
    /// Load configuration from environment variable or use defaults
    pub fn from_env() -> Result<Self> {
        if let Ok(config_json) = std::env::var(HEADERS_ENV_VAR) {
            serde_json::from_str(&config_json)
                .with_context(|| format!("Failed to parse {HEADERS_ENV_VAR}"))
        } else {
            Ok(Self::default())
        }
    }

    /// Check if a header should be forwarded based on configuration
    pub fn should_forward(&self, header_name: &str) -> bool {
        let name_lower = header_name.to_lowercase();

        if self
            .blocked_headers
            .iter()
            .any(|h| h.to_lowercase() == name_lower)
        {
            return false;
        }

        !self
            .blocked_prefixes
            .iter()
            .any(|prefix| name_lower.starts_with(&prefix.to_lowercase()))
    }

    /// Copy of `headers` without blocked headers or those named in `Connection`
    pub fn filter(&self, headers: &HeaderMap) -> HeaderMap {
        let connection_listed: Vec<String> = headers
            .get_all(CONNECTION)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        let mut filtered = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            if self.should_forward(name.as_str())
                && !connection_listed.iter().any(|n| n == name.as_str())
            {
                filtered.append(name.clone(), value.clone());
            }
        }
        filtered
    }
}
