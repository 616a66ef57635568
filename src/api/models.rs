//! Model listing.

use std::sync::Arc;

use serde_json::Value;

use crate::client::{ApiClient, ClientError};
use crate::resource;

pub struct Models {
    api: Arc<ApiClient>,
}

impl Models {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[resource]
impl Models {
    /// List the models available to the current user.
    pub async fn get_models(&self, #[default(false)] refresh: bool) -> Result<Value, ClientError> {
        self.api.get_with_query(&["models"], &[("refresh", refresh)]).await
    }
}
