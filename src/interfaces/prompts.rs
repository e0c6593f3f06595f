use async_trait::async_trait;

#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms without asking. Backs `--yes` on the command line.
pub struct AssumeYes;

#[async_trait]
impl Confirmation for AssumeYes {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
