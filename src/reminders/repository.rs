use std::sync::Arc;

use crate::domains::reminder::Reminder;
use crate::error::{Result, SimpleReminderError};
use crate::interfaces::reporting::ErrorSink;
use crate::interfaces::storage::KeyValueStore;

/// Storage key holding the client id used for usage metrics.
pub const CLIENT_ID_KEY: &str = "client_id";
/// Storage key holding the RFC 3339 time of the last sweep.
pub const LAST_CHECKED_KEY: &str = "last_checked";
/// Storage key holding the JSON summary shown by `status`.
pub const SUMMARY_KEY: &str = "menu_bar_summary";

pub const RESERVED_KEYS: [&str; 3] = [CLIENT_ID_KEY, LAST_CHECKED_KEY, SUMMARY_KEY];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quarantined {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub reminders: Vec<Reminder>,
    pub quarantined: Vec<Quarantined>,
}

/// Typed access to reminder records. One entry per reminder, keyed by its id;
/// the reserved keys hold bookkeeping values and are never read as reminders.
#[derive(Clone)]
pub struct ReminderRepository {
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn ErrorSink>,
}

impl ReminderRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, sink: Arc<dyn ErrorSink>) -> Self {
        Self { store, sink }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn save(&self, reminder: &Reminder) -> Result<()> {
        if is_reserved(&reminder.id) || reminder.id.trim().is_empty() {
            return Err(SimpleReminderError::Validation(format!(
                "'{}' cannot be used as a reminder id",
                reminder.id
            )));
        }
        self.store.set(&reminder.id, &reminder.to_json()?).await
    }

    pub async fn load(&self, id: &str) -> Result<Option<Reminder>> {
        if is_reserved(id) {
            return Ok(None);
        }
        match self.store.get(id).await? {
            Some(raw) => decode(id, &raw).map(Some),
            None => Ok(None),
        }
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        if is_reserved(id) {
            return Ok(false);
        }
        self.store.remove(id).await
    }

    /// Reads every reminder, sorted by date. Records that fail to decode are
    /// reported to the error sink and left out instead of failing the read.
    pub async fn load_all(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        for (key, raw) in self.store.entries().await? {
            if is_reserved(&key) {
                continue;
            }
            match decode(&key, &raw) {
                Ok(reminder) => report.reminders.push(reminder),
                Err(err) => {
                    let error = err.to_string();
                    self.sink.report(&key, &error);
                    report.quarantined.push(Quarantined { key, error });
                }
            }
        }
        sort_by_date(&mut report.reminders);
        Ok(report)
    }

    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.store.get(key).await
    }

    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        if !is_reserved(key) {
            return Err(SimpleReminderError::Validation(format!(
                "'{key}' is not a bookkeeping key"
            )));
        }
        self.store.set(key, value).await
    }

    /// Returns the stored client id, creating one on first use.
    pub async fn client_id(&self) -> Result<String> {
        if let Some(existing) = self.store.get(CLIENT_ID_KEY).await? {
            return Ok(existing);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.store.set(CLIENT_ID_KEY, &id).await?;
        Ok(id)
    }
}

fn decode(key: &str, raw: &str) -> Result<Reminder> {
    let reminder = Reminder::from_json(raw)?;
    if reminder.id != key {
        return Err(SimpleReminderError::Serialization(format!(
            "record id '{}' does not match its key",
            reminder.id
        )));
    }
    Ok(reminder)
}

pub fn sort_by_date(reminders: &mut [Reminder]) {
    reminders.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
}
