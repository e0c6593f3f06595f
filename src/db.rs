use std::env;
use std::path::Path;

use diesel::sqlite::SqliteConnection;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;

use crate::error::{Result, SimpleReminderError};

pub const DB_KEY_ENV: &str = "SIMPLE_REMINDER_DB_KEY";

/// Encryption is opt-in: without a key the database is plain SQLite.
pub fn get_sqlcipher_key() -> Option<String> {
    env::var(DB_KEY_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn key_pragma(key: &str) -> String {
    format!("PRAGMA key = '{}';", key.replace('\'', "''"))
}

pub fn apply_sqlcipher_key_sync(conn: &mut SqliteConnection) -> Result<()> {
    let Some(key) = get_sqlcipher_key() else {
        return Ok(());
    };
    diesel::RunQueryDsl::execute(diesel::sql_query(key_pragma(&key)), conn)
        .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
    Ok(())
}

pub async fn apply_sqlcipher_key_async(
    conn: &mut SyncConnectionWrapper<SqliteConnection>,
) -> Result<()> {
    let Some(key) = get_sqlcipher_key() else {
        return Ok(());
    };
    diesel_async::RunQueryDsl::execute(diesel::sql_query(key_pragma(&key)), conn)
        .await
        .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
    Ok(())
}

pub fn ensure_parent_dir(path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        }
    }
    Ok(())
}
