use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domains::reminder::Reminder;
use crate::error::Result;
use crate::reminders::repository::{ReminderRepository, LAST_CHECKED_KEY, SUMMARY_KEY};

/// What a menu bar would show: how many reminders are waiting and which one
/// fires next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub pending: usize,
    pub next_topic: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub refreshed_at: OffsetDateTime,
}

impl Summary {
    /// `reminders` must already be sorted by date.
    pub fn from_sorted(reminders: &[Reminder], now: OffsetDateTime) -> Self {
        let next = reminders.first();
        Self {
            pending: reminders.len(),
            next_topic: next.map(|reminder| reminder.topic.clone()),
            next_date: next.map(|reminder| reminder.date),
            refreshed_at: now.replace_nanosecond(0).unwrap_or(now),
        }
    }
}

pub async fn refresh_summary(
    repo: &ReminderRepository,
    reminders: &[Reminder],
    now: OffsetDateTime,
) -> Result<Summary> {
    let summary = Summary::from_sorted(reminders, now);
    repo.set_value(SUMMARY_KEY, &serde_json::to_string(&summary)?)
        .await?;
    Ok(summary)
}

pub async fn load_summary(repo: &ReminderRepository) -> Result<Option<Summary>> {
    match repo.get_value(SUMMARY_KEY).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn last_checked(repo: &ReminderRepository) -> Result<Option<String>> {
    repo.get_value(LAST_CHECKED_KEY).await
}
