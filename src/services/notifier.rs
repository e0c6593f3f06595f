use async_trait::async_trait;
use notify_rust::Notification;

use crate::error::{Result, SimpleReminderError};
use crate::interfaces::notifications::Notifier;

pub const NOTIFICATION_TITLE: &str = "Simple Reminder";
const NOTIFICATION_SOUND: &str = "default";

/// Native desktop notification with the platform's default alert sound.
pub struct DesktopNotifier;

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        let title = title.to_string();
        let body = body.to_string();
        tokio::task::spawn_blocking(move || {
            Notification::new()
                .summary(&title)
                .body(&body)
                .sound_name(NOTIFICATION_SOUND)
                .show()
                .map(|_| ())
                .map_err(|e| SimpleReminderError::Runtime(e.to_string()))
        })
        .await
        .map_err(|e| SimpleReminderError::Runtime(e.to_string()))?
    }
}

/// Makes a topic safe to hand to a single-line notification call: backslashes
/// and double quotes are escaped, line breaks and other control characters
/// become spaces.
pub fn sanitize_topic(topic: &str) -> String {
    let mut out = String::with_capacity(topic.len());
    for ch in topic.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
