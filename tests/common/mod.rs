#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use simple_reminder::domains::reminder::Reminder;
use simple_reminder::error::{Result, SimpleReminderError};
use simple_reminder::interfaces::notifications::Notifier;
use simple_reminder::interfaces::prompts::Confirmation;
use simple_reminder::interfaces::reporting::ErrorSink;
use simple_reminder::interfaces::storage::KeyValueStore;
use simple_reminder::providers::memory::InMemoryKeyValueStore;
use simple_reminder::reminders::ReminderRepository;

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
    /// Bodies containing this text fail to send.
    pub fail_on: Option<String>,
}

impl RecordingNotifier {
    pub fn failing_on(text: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_on: Some(text.to_string()),
        }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<()> {
        if let Some(needle) = &self.fail_on {
            if body.contains(needle.as_str()) {
                return Err(SimpleReminderError::Runtime("notification refused".to_string()));
            }
        }
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub reports: Mutex<Vec<String>>,
}

impl ErrorSink for RecordingSink {
    fn report(&self, key: &str, _error: &str) {
        self.reports.lock().unwrap().push(key.to_string());
    }
}

pub struct ScriptedConfirmation {
    pub answer: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Confirmation for ScriptedConfirmation {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }
}

pub struct Harness {
    pub store: Arc<InMemoryKeyValueStore>,
    pub sink: Arc<RecordingSink>,
    pub repo: ReminderRepository,
}

pub fn harness() -> Harness {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let sink = Arc::new(RecordingSink::default());
    let repo = ReminderRepository::new(store.clone(), sink.clone());
    Harness { store, sink, repo }
}

pub async fn seed(store: &InMemoryKeyValueStore, topic: &str, date: OffsetDateTime) -> Reminder {
    let reminder = Reminder::new(topic, date);
    store
        .set(&reminder.id, &reminder.to_json().unwrap())
        .await
        .unwrap();
    reminder
}

/// In-memory store whose removals can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryKeyValueStore,
    pub fail_removes: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(SimpleReminderError::Storage("disk is read-only".to_string()));
        }
        self.inner.remove(key).await
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        self.inner.entries().await
    }
}
