use async_trait::async_trait;

use crate::error::Result;

/// String-keyed, string-valued durable storage. Values are opaque here; typed
/// access lives in `reminders::ReminderRepository`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<bool>;
    async fn entries(&self) -> Result<Vec<(String, String)>>;
}
