//! SQLite-backed key-value store using sqlx.
//!
//! Schema: `kv(key TEXT PRIMARY KEY, value BLOB, updated_at INTEGER)`.
//! Every operation is a single statement, so single-key atomicity comes from SQLite.

use async_trait::async_trait;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::str::FromStr;
use telemost_types::{KvStore, traits::Result};

/// A persistent [`KvStore`] backed by `SQLite`.
pub struct SqliteKvStore {
    /// Connection pool to the `SQLite` database.
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Connects to a `SQLite` database (e.g. `"sqlite:./kv.db"` or `"sqlite::memory:"`).
    ///
    /// Automatically creates the database file if it does not exist and
    /// creates the `kv` table.
    ///
    /// # Errors
    ///
    /// Returns a [`sqlx::Error`] if the connection or table creation fails.
    pub async fn new(database_url: &str) -> std::result::Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Each connection to `:memory:` is a separate database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> std::result::Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                key         TEXT    NOT NULL PRIMARY KEY,
                value       BLOB    NOT NULL,
                updated_at  INTEGER NOT NULL DEFAULT (unixepoch())
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = unixepoch()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        let removed = res.rows_affected() > 0;
        tracing::debug!(key, removed, "kv delete");
        Ok(removed)
    }
}
