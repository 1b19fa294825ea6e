//! Storage abstractions for session state.
//!
//! A small string key/value interface shaped like browser local storage, with
//! a JSON-file implementation.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod json_file_store;

pub use json_file_store::JsonFileStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Option<String>;
    async fn set_item(&self, key: &str, value: String) -> Result<(), ServiceError>;
    async fn remove_item(&self, key: &str) -> Result<(), ServiceError>;
}
