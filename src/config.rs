use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use time::UtcOffset;

use crate::error::{Result, SimpleReminderError};
use crate::zone::{FixedZone, LocalZone, SystemZone};

pub const DEFAULT_CONFIG_PATH: &str = "./data/simple-reminder.json";
pub const DEFAULT_DB_PATH: &str = "./data/simple-reminder.db";
pub const DEFAULT_PUSH_BASE_URL: &str = "https://ntfy.sh";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub sqlite_path: Option<String>,
}

/// Opt-in relay that mirrors every fired reminder to a phone through ntfy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PushConfig {
    pub enabled: Option<bool>,
    pub topic: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushSettings {
    pub base_url: String,
    pub topic: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub storage: Option<StorageConfig>,
    pub push: Option<PushConfig>,
    pub utc_offset_minutes: Option<i32>,
    pub client_id: Option<String>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| SimpleReminderError::Config(e.to_string()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| SimpleReminderError::Config(e.to_string()))?;
        Ok(config)
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve_db_path(&self, cli_override: Option<&str>) -> String {
        let configured = self
            .storage
            .as_ref()
            .and_then(|storage| storage.sqlite_path.as_deref());
        cli_override
            .into_iter()
            .chain(configured)
            .map(str::trim)
            .find(|path| !path.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
    }

    pub fn push_settings(&self) -> Option<PushSettings> {
        let push = self.push.as_ref()?;
        if !push.enabled.unwrap_or(false) {
            return None;
        }
        let topic = push
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())?;
        let base_url = push
            .base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_PUSH_BASE_URL);
        Some(PushSettings {
            base_url: base_url.to_string(),
            topic: topic.to_string(),
        })
    }

    /// Zone used to read phrases like "tomorrow at 9" and to show dates.
    /// An explicit `utc_offset_minutes` pins a fixed offset; otherwise the
    /// system zone applies, daylight saving included.
    pub fn zone(&self) -> Result<Arc<dyn LocalZone>> {
        match self.utc_offset_minutes {
            Some(minutes) => {
                let offset = UtcOffset::from_whole_seconds(minutes * 60)
                    .map_err(|e| SimpleReminderError::Config(e.to_string()))?;
                Ok(Arc::new(FixedZone(offset)))
            }
            None => Ok(Arc::new(SystemZone)),
        }
    }
}
