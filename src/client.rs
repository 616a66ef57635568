//! Open WebUI client core and error types.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::api::{Chats, Files, Memories, Models};
use crate::http::{add_extra_headers, build_http_client, ApiResponseExt, RequestBuilderExt};
use crate::options::{ClientOptions, TransportOptions};
use crate::resource::{Resource, ResourceGraph};
use crate::value::InvocationError;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("invalid path parameter {0:?}")]
    InvalidPathParameter(String),
}

impl ClientError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "HttpError",
            Self::Api { .. } => "ApiError",
            Self::Parse(_) => "ParseError",
            Self::Config(_) => "ConfigurationError",
            Self::InvalidPathParameter(_) => "InvalidArgument",
        }
    }
}

impl From<ClientError> for InvocationError {
    fn from(err: ClientError) -> Self {
        InvocationError::failed(err.kind(), err.to_string())
    }
}

/// Authenticated HTTP access to one Open WebUI server.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    transport: TransportOptions,
}

impl ApiClient {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let base_url = Url::parse(&options.api_url)
            .map_err(|e| ClientError::Config(format!("invalid API URL {}: {}", options.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "invalid API URL {}: not a base URL",
                options.api_url
            )));
        }

        Ok(Self {
            http: build_http_client(&options.transport)?,
            base_url,
            api_key: options.api_key,
            transport: options.transport,
        })
    }

    /// Append `path` to the base URL, escaping each element as one segment.
    ///
    /// A trailing `""` element produces a trailing slash.
    fn url(&self, path: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("invalid API URL {}: not a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, ClientError> {
        let url = self.url(path)?;
        tracing::debug!("API request {} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        Ok(add_extra_headers(request, &self.transport))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, ClientError> {
        self.request(Method::GET, path)?.send().await?.json_logged().await
    }

    pub async fn get_with_query<Q, T>(&self, path: &[&str], query: &Q) -> Result<T, ClientError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::GET, path)?
            .query(query)
            .send()
            .await?
            .json_logged()
            .await
    }

    pub async fn get_bytes(&self, path: &[&str]) -> Result<Bytes, ClientError> {
        self.request(Method::GET, path)?.send().await?.bytes_logged().await
    }

    pub async fn post<B, T>(&self, path: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path)?
            .json_logged(body)
            .send()
            .await?
            .json_logged()
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &[&str],
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        self.request(Method::POST, path)?
            .multipart(form)
            .send()
            .await?
            .json_logged()
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, ClientError> {
        self.request(Method::DELETE, path)?.send().await?.json_logged().await
    }
}

/// Check a caller-supplied value before it becomes a path segment.
///
/// Empty, `.` and `..` values would address a different endpoint.
pub fn path_param(value: &str) -> Result<&str, ClientError> {
    match value {
        "" | "." | ".." => Err(ClientError::InvalidPathParameter(value.to_string())),
        value => Ok(value),
    }
}

/// The Open WebUI API as a resource graph.
#[derive(Clone)]
pub struct OpenWebUi {
    pub chats: Arc<Chats>,
    pub files: Arc<Files>,
    pub memories: Arc<Memories>,
    pub models: Arc<Models>,
}

impl OpenWebUi {
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        let api = Arc::new(ApiClient::new(options)?);
        Ok(Self {
            chats: Arc::new(Chats::new(Arc::clone(&api))),
            files: Arc::new(Files::new(Arc::clone(&api))),
            memories: Arc::new(Memories::new(Arc::clone(&api))),
            models: Arc::new(Models::new(api)),
        })
    }
}

impl ResourceGraph for OpenWebUi {
    fn resources(&self) -> Vec<(String, Arc<dyn Resource>)> {
        vec![
            ("chats".to_string(), Arc::clone(&self.chats) as Arc<dyn Resource>),
            ("files".to_string(), Arc::clone(&self.files) as Arc<dyn Resource>),
            ("memories".to_string(), Arc::clone(&self.memories) as Arc<dyn Resource>),
            ("models".to_string(), Arc::clone(&self.models) as Arc<dyn Resource>),
        ]
    }
}
