use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel::upsert::excluded;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::RunQueryDsl;

use crate::db::{apply_sqlcipher_key_async, apply_sqlcipher_key_sync, ensure_parent_dir};
use crate::error::{Result, SimpleReminderError};
use crate::interfaces::storage::KeyValueStore;

mod schema;
use schema::local_storage;

type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
type SqlitePool = Pool<SqliteAsyncConn>;
type SqlitePooledConn<'a> = PooledConnection<'a, SqliteAsyncConn>;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS local_storage (
    \"key\" TEXT PRIMARY KEY NOT NULL,
    \"value\" TEXT NOT NULL,
    updated_at BIGINT NOT NULL
)";

#[derive(Queryable)]
struct StorageRow {
    key: String,
    value: String,
    _updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = local_storage)]
struct NewEntry<'a> {
    key: &'a str,
    value: &'a str,
    updated_at: i64,
}

pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    pub async fn new(sqlite_path: impl AsRef<str>) -> Result<Self> {
        let sqlite_path = sqlite_path.as_ref();
        ensure_parent_dir(sqlite_path)?;
        ensure_table(sqlite_path).await?;

        let manager = AsyncDieselConnectionManager::<SqliteAsyncConn>::new(sqlite_path);
        let pool: SqlitePool = Pool::builder()
            .build(manager)
            .await
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        tracing::debug!(path = sqlite_path, "opened reminder storage");
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<SqlitePooledConn<'_>> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        apply_sqlcipher_key_async(&mut conn).await?;
        Ok(conn)
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        let row: Option<StorageRow> = local_storage::table
            .filter(local_storage::key.eq(key))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        Ok(row.map(|row| row.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let new = NewEntry {
            key,
            value,
            updated_at: now_ts(),
        };
        let mut conn = self.conn().await?;
        diesel::insert_into(local_storage::table)
            .values(&new)
            .on_conflict(local_storage::key)
            .do_update()
            .set((
                local_storage::value.eq(excluded(local_storage::value)),
                local_storage::updated_at.eq(excluded(local_storage::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(local_storage::table.filter(local_storage::key.eq(key)))
            .execute(&mut conn)
            .await
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        Ok(deleted > 0)
    }

    async fn entries(&self) -> Result<Vec<(String, String)>> {
        let mut conn = self.conn().await?;
        let rows: Vec<StorageRow> = local_storage::table
            .order(local_storage::key.asc())
            .load(&mut conn)
            .await
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        Ok(rows.into_iter().map(|row| (row.key, row.value)).collect())
    }
}

async fn ensure_table(database_url: &str) -> Result<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = SqliteConnection::establish(&database_url)
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        apply_sqlcipher_key_sync(&mut conn)?;
        diesel::RunQueryDsl::execute(diesel::sql_query(CREATE_TABLE), &mut conn)
            .map_err(|e| SimpleReminderError::Storage(e.to_string()))?;
        Ok::<_, SimpleReminderError>(())
    })
    .await
    .map_err(|e| SimpleReminderError::Runtime(e.to_string()))??;
    Ok(())
}

fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
