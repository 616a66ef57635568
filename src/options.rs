//! Client configuration.

use std::collections::HashMap;
use std::time::Duration;

/// Base URL used when `OWUI_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

pub const API_URL_VAR: &str = "OWUI_API_URL";
pub const API_KEY_VAR: &str = "OWUI_API_KEY";

/// Connection settings for an Open WebUI server.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// API base URL, e.g. `http://127.0.0.1:8080/api`.
    pub api_url: String,

    /// Bearer token or API key. Requests are unauthenticated without one.
    pub api_key: Option<String>,

    pub transport: TransportOptions,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl ClientOptions {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: None,
            transport: TransportOptions::default(),
        }
    }

    /// Read `OWUI_API_URL` and `OWUI_API_KEY` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_key = lookup(API_KEY_VAR).filter(|key| !key.is_empty());

        Self {
            api_url,
            api_key,
            transport: TransportOptions::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }
}

/// Transport configuration options.
///
/// Controls how requests are sent over the network.
#[derive(Debug, Clone)]
pub enum TransportOptions {
    Http {
        /// Request timeout. If None, the default client timeout is used.
        timeout: Option<Duration>,
        /// HTTP proxy URL.
        proxy: Option<String>,
        /// Additional HTTP headers to send with every request.
        headers: Option<HashMap<String, String>>,
    },
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions::Http {
            timeout: None,
            proxy: None,
            headers: None,
        }
    }
}

impl TransportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        match &mut self {
            TransportOptions::Http { timeout, .. } => *timeout = Some(duration),
        }
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        match &mut self {
            TransportOptions::Http { proxy, .. } => *proxy = Some(proxy_url.into()),
        }
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            TransportOptions::Http { headers, .. } => {
                headers
                    .get_or_insert_with(HashMap::new)
                    .insert(key.into(), value.into());
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        let options = ClientOptions::from_lookup(|_| None);
        assert_eq!(options.api_url, DEFAULT_API_URL);
        assert_eq!(options.api_key, None);
    }

    #[test]
    fn test_reads_variables_and_ignores_empty_key() {
        let options = ClientOptions::from_lookup(|key| match key {
            API_URL_VAR => Some("https://webui.example.com/api".to_string()),
            API_KEY_VAR => Some(String::new()),
            _ => None,
        });
        assert_eq!(options.api_url, "https://webui.example.com/api");
        assert_eq!(options.api_key, None);

        let options = ClientOptions::from_lookup(|key| (key == API_KEY_VAR).then(|| "sk-1".to_string()));
        assert_eq!(options.api_key.as_deref(), Some("sk-1"));
    }
}
