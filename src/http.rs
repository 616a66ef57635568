//! HTTP helpers for talking to the Open WebUI API.

use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::client::ClientError;
use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    match transport_options {
        TransportOptions::Http { timeout, proxy, .. } => {
            if let Some(t) = timeout {
                builder = builder.timeout(*t);
            }
            if let Some(proxy_url) = proxy {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| ClientError::Config(format!("invalid proxy {}: {}", proxy_url, e)))?;
                builder = builder.proxy(proxy);
            }
        }
    }

    builder
        .build()
        .map_err(|e| ClientError::Config(format!("cannot build HTTP client: {}", e)))
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    transport_options: &TransportOptions,
) -> RequestBuilder {
    match transport_options {
        TransportOptions::Http { headers, .. } => {
            if let Some(h) = headers {
                for (key, value) in h {
                    request = request.header(key, value);
                }
            }
        }
    }
    request
}

/// Extension trait for RequestBuilder that logs request body.
pub trait RequestBuilderExt {
    /// Set JSON request body and log it.
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        if let Ok(req_body) = serde_json::to_string(json) {
            tracing::debug!("API request body ({} bytes): {}", req_body.len(), req_body);
        }

        self.json(json)
    }
}

/// Extension trait turning API responses into typed results.
#[async_trait::async_trait]
pub trait ApiResponseExt: Sized {
    /// Fail with [`ClientError::Api`] on a non-success status.
    async fn checked(self) -> Result<Self, ClientError>;

    /// Check the status, then parse the body as JSON.
    async fn json_logged<T: DeserializeOwned>(self) -> Result<T, ClientError>;

    /// Check the status, then return the raw body.
    async fn bytes_logged(self) -> Result<Bytes, ClientError>;
}

#[async_trait::async_trait]
impl ApiResponseExt for Response {
    async fn checked(self) -> Result<Self, ClientError> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }

        let url = self.url().to_string();
        let body = self.text().await.unwrap_or_default();
        tracing::debug!("API error response {} from {}: {}", status, url, body);
        Err(ClientError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn json_logged<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let bytes = self.checked().await?.bytes().await?;

        if let Ok(text) = std::str::from_utf8(&bytes) {
            tracing::debug!("API response ({} bytes): {}", text.len(), text);
        }

        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    async fn bytes_logged(self) -> Result<Bytes, ClientError> {
        let bytes = self.checked().await?.bytes().await?;
        tracing::debug!("API response ({} bytes of binary content)", bytes.len());
        Ok(bytes)
    }
}
