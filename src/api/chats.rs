//! Chat history endpoints.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::{path_param, ApiClient, ClientError};
use crate::{resource, Record};

/// One entry of a chat listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct ChatTitleIdResponse {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
    pub created_at: i64,
}

/// A stored chat with its full message history.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct ChatResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub chat: Map<String, Value>,
    pub updated_at: i64,
    pub created_at: i64,
    pub share_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
    pub pinned: Option<bool>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    pub folder_id: Option<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct ChatForm {
    /// Chat document: title, models, messages and history.
    pub chat: Map<String, Value>,
    pub folder_id: Option<String>,
}

/// Metadata attached to an imported chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatMeta {
    #[serde(default)]
    pub tags: Vec<String>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Record)]
pub struct ChatImportForm {
    pub chat: Map<String, Value>,
    pub meta: Option<ChatMeta>,
    pub pinned: Option<bool>,
    pub folder_id: Option<String>,
}

pub struct Chats {
    api: Arc<ApiClient>,
}

impl Chats {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[resource]
impl Chats {
    /// Get the current user's chats, newest first, one page at a time.
    pub async fn get_chat_list(&self, #[default(1)] page: i64) -> Result<Vec<ChatTitleIdResponse>, ClientError> {
        self.api.get_with_query(&["chats", "list"], &[("page", page)]).await
    }

    /// Search the current user's chats by title and content.
    pub async fn search_chats(
        &self,
        text: String,
        #[default(1)] page: i64,
    ) -> Result<Vec<ChatTitleIdResponse>, ClientError> {
        self.api
            .get_with_query(&["chats", "search"], &[("text", text), ("page", page.to_string())])
            .await
    }

    /// Get a chat by its id.
    pub async fn get_chat_by_id(&self, id: String) -> Result<ChatResponse, ClientError> {
        self.api.get(&["chats", path_param(&id)?]).await
    }

    /// Create a new chat.
    pub async fn create_new_chat(&self, form_data: ChatForm) -> Result<ChatResponse, ClientError> {
        self.api.post(&["chats", "new"], &form_data).await
    }

    /// Import a chat exported from another instance.
    pub async fn import_chat(&self, form_data: ChatImportForm) -> Result<ChatResponse, ClientError> {
        self.api.post(&["chats", "import"], &form_data).await
    }

    /// Import several chats, stopping at the first failure.
    pub async fn import_chats(&self, chats: Vec<ChatImportForm>) -> Result<Vec<ChatResponse>, ClientError> {
        let mut imported = Vec::with_capacity(chats.len());
        for form_data in chats {
            imported.push(self.import_chat(form_data).await?);
        }
        Ok(imported)
    }

    /// Delete a chat by its id.
    pub async fn delete_chat_by_id(&self, id: String) -> Result<bool, ClientError> {
        self.api.delete(&["chats", path_param(&id)?]).await
    }
}
