pub mod repository;

use time::OffsetDateTime;

use crate::domains::reminder::{Frequency, Reminder};
use crate::effects::best_effort;
use crate::error::{Result, SimpleReminderError};
use crate::interfaces::prompts::Confirmation;
use crate::parser::ReminderParser;
use crate::summary::refresh_summary;

pub use repository::{LoadReport, Quarantined, ReminderRepository};

/// The reminders of one session, kept sorted by date. Every mutation writes
/// storage first, so a failed write leaves both storage and the list as they
/// were.
pub struct ReminderBook {
    repo: ReminderRepository,
    reminders: Vec<Reminder>,
}

impl ReminderBook {
    pub async fn open(repo: ReminderRepository) -> Result<Self> {
        let report = repo.load_all().await?;
        Ok(Self {
            repo,
            reminders: report.reminders,
        })
    }

    pub fn repository(&self) -> &ReminderRepository {
        &self.repo
    }

    pub fn read_all(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.reminders.iter().find(|reminder| reminder.id == id)
    }

    pub async fn reload(&mut self) -> Result<LoadReport> {
        let report = self.repo.load_all().await?;
        self.reminders = report.reminders.clone();
        Ok(report)
    }

    /// Accepts a full id or any prefix that matches exactly one reminder.
    pub fn resolve_id(&self, id_or_prefix: &str) -> Result<String> {
        let needle = id_or_prefix.trim();
        if needle.is_empty() {
            return Err(SimpleReminderError::Validation(
                "a reminder id is required".to_string(),
            ));
        }
        if self.get(needle).is_some() {
            return Ok(needle.to_string());
        }
        let mut matches = self
            .reminders
            .iter()
            .filter(|reminder| reminder.id.starts_with(needle));
        match (matches.next(), matches.next()) {
            (Some(found), None) => Ok(found.id.clone()),
            (Some(_), Some(_)) => Err(SimpleReminderError::Validation(format!(
                "'{needle}' matches more than one reminder"
            ))),
            (None, _) => Err(SimpleReminderError::NotFound(needle.to_string())),
        }
    }

    pub async fn create(&mut self, reminder: Reminder, now: OffsetDateTime) -> Result<Reminder> {
        if reminder.date <= now {
            return Err(SimpleReminderError::Validation(
                "the reminder date must be in the future".to_string(),
            ));
        }
        if reminder.topic.trim().is_empty() {
            return Err(SimpleReminderError::Validation(
                "the reminder needs something to remind you of".to_string(),
            ));
        }

        self.repo.save(&reminder).await?;
        let position = self
            .reminders
            .partition_point(|existing| existing.date <= reminder.date);
        self.reminders.insert(position, reminder.clone());
        tracing::info!(id = %reminder.id, date = %reminder.date, "reminder created");

        best_effort(
            "summary refresh",
            refresh_summary(&self.repo, &self.reminders, now),
        )
        .await;
        Ok(reminder)
    }

    pub async fn create_from_text(
        &mut self,
        parser: &ReminderParser,
        text: &str,
        now: OffsetDateTime,
    ) -> Result<Reminder> {
        let parsed = parser.parse(text, now);
        let Some(date) = parsed.date else {
            return Err(SimpleReminderError::Validation(
                "could not find a date or time in the text".to_string(),
            ));
        };
        self.create(Reminder::new(parsed.topic, date), now).await
    }

    pub async fn update_recurrence(
        &mut self,
        id: &str,
        frequency: Option<Frequency>,
    ) -> Result<Reminder> {
        self.update(id, |reminder| reminder.frequency = frequency)
            .await
    }

    pub async fn update_url(&mut self, id: &str, url: &str) -> Result<Reminder> {
        let url = url.trim();
        reqwest::Url::parse(url).map_err(|e| {
            SimpleReminderError::Validation(format!("'{url}' is not a valid URL: {e}"))
        })?;
        self.update(id, |reminder| reminder.url = Some(url.to_string()))
            .await
    }

    /// Returns `Ok(false)` when the user declines, leaving everything intact.
    pub async fn delete(&mut self, id: &str, confirmation: &dyn Confirmation) -> Result<bool> {
        let index = self.index_of(id)?;
        let prompt = format!("Delete reminder \"{}\"?", self.reminders[index].topic);
        if !confirmation.confirm(&prompt).await {
            tracing::debug!(id, "delete declined");
            return Ok(false);
        }

        self.repo.remove(id).await?;
        self.reminders.remove(index);
        tracing::info!(id, "reminder deleted");

        best_effort(
            "summary refresh",
            refresh_summary(&self.repo, &self.reminders, OffsetDateTime::now_utc()),
        )
        .await;
        Ok(true)
    }

    async fn update<F>(&mut self, id: &str, change: F) -> Result<Reminder>
    where
        F: FnOnce(&mut Reminder),
    {
        let index = self.index_of(id)?;
        // A sweep may have fired the reminder since this book was opened.
        let Some(mut updated) = self.repo.load(id).await? else {
            self.reminders.remove(index);
            return Err(SimpleReminderError::NotFound(id.to_string()));
        };
        change(&mut updated);
        self.repo.save(&updated).await?;
        self.reminders[index] = updated.clone();
        Ok(updated)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.reminders
            .iter()
            .position(|reminder| reminder.id == id)
            .ok_or_else(|| SimpleReminderError::NotFound(id.to_string()))
    }
}
