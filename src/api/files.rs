//! Uploaded file endpoints.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{path_param, ApiClient, ClientError};
use crate::{resource, Record};

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct FileModelResponse {
    pub id: String,
    pub user_id: String,
    pub hash: Option<String>,
    pub filename: String,
    pub data: Option<Map<String, Value>>,
    pub meta: Option<Map<String, Value>>,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

pub struct Files {
    api: Arc<ApiClient>,
}

impl Files {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[resource]
impl Files {
    /// List the files visible to the current user.
    pub async fn get_files(&self) -> Result<Vec<FileModelResponse>, ClientError> {
        self.api.get(&["files", ""]).await
    }

    /// Get a file's metadata by its id.
    pub async fn get_file_by_id(&self, id: String) -> Result<FileModelResponse, ClientError> {
        self.api.get(&["files", path_param(&id)?]).await
    }

    /// Download a file's raw content.
    pub async fn get_file_content_by_id(&self, id: String) -> Result<Bytes, ClientError> {
        self.api.get_bytes(&["files", path_param(&id)?, "content"]).await
    }

    /// Upload a file.
    pub async fn upload_file(&self, file: Bytes, filename: String) -> Result<FileModelResponse, ClientError> {
        let part = Part::bytes(file.to_vec()).file_name(filename);
        self.api.post_multipart(&["files", ""], Form::new().part("file", part)).await
    }

    /// Delete a file by its id.
    pub async fn delete_file_by_id(&self, id: String) -> Result<Value, ClientError> {
        self.api.delete(&["files", path_param(&id)?]).await
    }
}
