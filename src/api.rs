//! Open WebUI API resources.

pub mod chats;
pub mod files;
pub mod memories;
pub mod models;

pub use chats::{ChatForm, ChatImportForm, ChatMeta, ChatResponse, ChatTitleIdResponse, Chats};
pub use files::{FileModelResponse, Files};
pub use memories::{AddMemoryForm, Memories, MemoryModel, QueryMemoryForm};
pub use models::Models;
