use std::time::Duration;

use async_trait::async_trait;

use crate::config::PushSettings;
use crate::error::{Result, SimpleReminderError};
use crate::interfaces::notifications::PushRelay;
use crate::services::notifier::NOTIFICATION_TITLE;

const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes reminder text to an ntfy topic so it reaches subscribed phones.
pub struct NtfyRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl NtfyRelay {
    pub fn new(settings: &PushSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PUSH_TIMEOUT)
            .build()
            .map_err(|e| SimpleReminderError::Http(e.to_string()))?;
        let endpoint = format!(
            "{}/{}",
            settings.base_url.trim_end_matches('/'),
            urlencoding::encode(&settings.topic)
        );
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PushRelay for NtfyRelay {
    async fn push(&self, text: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Title", NOTIFICATION_TITLE)
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| SimpleReminderError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SimpleReminderError::Http(format!(
                "push relay answered {status}"
            )));
        }
        tracing::debug!(endpoint = %self.endpoint, "push relayed");
        Ok(())
    }
}
