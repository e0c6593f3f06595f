use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

#[async_trait]
pub trait PushRelay: Send + Sync {
    async fn push(&self, text: &str) -> Result<()>;
}
