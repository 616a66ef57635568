//! Memory endpoints.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{path_param, ApiClient, ClientError};
use crate::{resource, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct MemoryModel {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub updated_at: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct AddMemoryForm {
    pub content: String,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct QueryMemoryForm {
    pub content: String,
    /// Maximum number of matches.
    pub k: Option<i64>,
}

pub struct Memories {
    api: Arc<ApiClient>,
}

impl Memories {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[resource]
impl Memories {
    /// List the current user's memories.
    pub async fn get_memories(&self) -> Result<Vec<MemoryModel>, ClientError> {
        self.api.get(&["memories", ""]).await
    }

    /// Store a new memory.
    pub async fn add_memory(&self, form_data: AddMemoryForm) -> Result<MemoryModel, ClientError> {
        self.api.post(&["memories", "add"], &form_data).await
    }

    /// Find the memories closest to the given content.
    pub async fn query_memory(&self, form_data: QueryMemoryForm) -> Result<Value, ClientError> {
        self.api.post(&["memories", "query"], &form_data).await
    }

    /// Delete a memory by its id.
    pub async fn delete_memory_by_id(&self, id: String) -> Result<bool, ClientError> {
        self.api.delete(&["memories", path_param(&id)?]).await
    }
}
