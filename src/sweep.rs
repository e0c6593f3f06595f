use std::sync::Arc;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domains::reminder::Reminder;
use crate::effects::best_effort;
use crate::error::{Result, SimpleReminderError};
use crate::interfaces::notifications::{Notifier, PushRelay};
use crate::reminders::repository::{ReminderRepository, LAST_CHECKED_KEY};
use crate::services::notifier::{sanitize_topic, NOTIFICATION_TITLE};
use crate::summary::refresh_summary;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Ids of reminders that were notified and removed.
    pub fired: Vec<String>,
    /// Reminders still waiting for their time.
    pub kept: usize,
    /// Ids of due reminders that were not delivered; they stay stored and
    /// are retried by the next sweep.
    pub failed: Vec<String>,
    pub quarantined: usize,
}

/// Fires every due reminder once. There is no scheduler here: the host calls
/// `run` on whatever cadence it likes, and runs are not guarded against
/// overlapping.
pub struct Sweeper {
    repo: ReminderRepository,
    notifier: Arc<dyn Notifier>,
    relay: Option<Arc<dyn PushRelay>>,
}

impl Sweeper {
    pub fn new(repo: ReminderRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            relay: None,
        }
    }

    pub fn with_relay(mut self, relay: Arc<dyn PushRelay>) -> Self {
        self.relay = Some(relay);
        self
    }

    pub async fn run(&self, now: OffsetDateTime) -> Result<SweepReport> {
        let loaded = self.repo.load_all().await?;
        let mut report = SweepReport {
            quarantined: loaded.quarantined.len(),
            ..SweepReport::default()
        };
        let mut remaining: Vec<Reminder> = Vec::new();

        for reminder in loaded.reminders {
            if !reminder.is_due(now) {
                remaining.push(reminder);
                continue;
            }
            match self.fire(&reminder).await {
                Ok(()) => report.fired.push(reminder.id),
                Err(err) => {
                    tracing::error!(id = %reminder.id, error = %err, "failed to fire reminder");
                    report.failed.push(reminder.id.clone());
                    remaining.push(reminder);
                }
            }
        }
        report.kept = remaining.len() - report.failed.len();

        let stamp = now
            .format(&Rfc3339)
            .map_err(|e| SimpleReminderError::Serialization(e.to_string()))?;
        best_effort(
            "last checked update",
            self.repo.set_value(LAST_CHECKED_KEY, &stamp),
        )
        .await;
        best_effort(
            "summary refresh",
            refresh_summary(&self.repo, &remaining, now),
        )
        .await;

        tracing::info!(
            fired = report.fired.len(),
            kept = report.kept,
            failed = report.failed.len(),
            "sweep finished"
        );
        Ok(report)
    }

    async fn fire(&self, reminder: &Reminder) -> Result<()> {
        // Removal comes first: a delivered reminder must never fire again.
        self.repo.remove(&reminder.id).await?;

        let body = sanitize_topic(&reminder.topic);
        if let Err(err) = self.notifier.notify(NOTIFICATION_TITLE, &body).await {
            if let Err(restore) = self.repo.save(reminder).await {
                tracing::error!(
                    id = %reminder.id,
                    error = %restore,
                    "undelivered reminder could not be restored"
                );
            }
            return Err(err);
        }

        if let Some(relay) = &self.relay {
            best_effort("push relay", relay.push(&reminder.topic)).await;
        }
        if let Some(frequency) = reminder.frequency {
            // Recurrence is informational: the reminder is not rescheduled.
            tracing::debug!(id = %reminder.id, %frequency, "recurring reminder fired");
        }
        Ok(())
    }
}
