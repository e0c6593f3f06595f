use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::interfaces::notifications::Notifier;
use crate::interfaces::reporting::TracingErrorSink;
use crate::providers::sqlite::SqliteKeyValueStore;
use crate::reminders::repository::CLIENT_ID_KEY;
use crate::reminders::{ReminderBook, ReminderRepository};
use crate::services::notifier::DesktopNotifier;
use crate::services::push::NtfyRelay;
use crate::sweep::Sweeper;

/// Wires storage, notifications and the optional push relay from a `Config`.
pub struct SimpleReminderFactory;

impl SimpleReminderFactory {
    pub async fn repository(config: &Config, db_override: Option<&str>) -> Result<ReminderRepository> {
        let db_path = config.resolve_db_path(db_override);
        let store = SqliteKeyValueStore::new(&db_path).await?;
        let repo = ReminderRepository::new(Arc::new(store), Arc::new(TracingErrorSink));
        let configured = config
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty());
        match configured {
            Some(client_id) => repo.set_value(CLIENT_ID_KEY, client_id).await?,
            None => {
                let client_id = repo.client_id().await?;
                tracing::debug!(%client_id, "using stored client id");
            }
        }
        Ok(repo)
    }

    pub async fn book(config: &Config, db_override: Option<&str>) -> Result<ReminderBook> {
        ReminderBook::open(Self::repository(config, db_override).await?).await
    }

    pub fn sweeper(config: &Config, repo: ReminderRepository) -> Result<Sweeper> {
        Self::sweeper_with_notifier(config, repo, Arc::new(DesktopNotifier))
    }

    pub fn sweeper_with_notifier(
        config: &Config,
        repo: ReminderRepository,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Sweeper> {
        let sweeper = Sweeper::new(repo, notifier);
        match config.push_settings() {
            Some(settings) => {
                let relay = NtfyRelay::new(&settings)?;
                tracing::debug!(endpoint = relay.endpoint(), "push relay enabled");
                Ok(sweeper.with_relay(Arc::new(relay)))
            }
            None => Ok(sweeper),
        }
    }
}
