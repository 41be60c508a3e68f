// SPDX-License-Identifier: Apache-2.0
use std::str::FromStr;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use crate::config::db::DBConfig;
use crate::db::db_references::DBReferences;
use crate::error::cache::CacheError;

/// Database Pool
pub struct DBPool;

impl DBPool {

    /// Create a new DB Pool for the given SQLite URI, creating the database file when missing
    pub async fn from_config(config: &DBConfig, uri: &str) -> Result<SqlitePool, CacheError> {
        let options = SqliteConnectOptions::from_str(uri)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // Build the pool from the config file
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| CacheError::from(e).with_context(format!("failed to open the reference index {}", uri)))?;

        // Create the table
        DBReferences::create_table(&pool).await?;

        Ok(pool)
    }

    /// Single connection in memory database, the database lives as long as that connection
    #[cfg(test)]
    pub async fn in_memory() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await.expect("Failed to create Database pool");

        DBReferences::create_table(&pool).await.expect("Failed to create the 'references' table");
        pool
    }
}
