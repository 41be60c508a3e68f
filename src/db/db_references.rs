// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, Utc};
use sqlx::{Row, Executor, SqlitePool};
use sqlx::sqlite::SqliteRow;
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::models::reference_record::ReferenceRecord;
use crate::registry::digest::Digest;

/// Return the root manifest digest bound to a reference
const REFERENCE_RECORD:&str = "SELECT reference, digest, size, mime, bound_at FROM artifact_references WHERE reference = $1;";

/// Upsert a record in the references table: last write wins
const REFERENCE_UPSERT_QUERY: &str = "INSERT INTO artifact_references (reference, digest, size, mime, bound_at) VALUES ($1, $2, $3, $4, $5) \
ON CONFLICT(reference) DO UPDATE SET digest=excluded.digest, size=excluded.size, mime=excluded.mime, bound_at=excluded.bound_at;";

/// Delete a reference binding
#[cfg(test)]
const REFERENCE_DELETE_QUERY: &str = "DELETE FROM artifact_references WHERE reference = $1;";

/// DANGER: Delete all records
#[cfg(test)]
const REFERENCE_DELETE_ALL:&str = "DELETE from artifact_references;";

/// Create the references database table
const REFERENCES_TABLE:&str = r#"
-- CREATORS
CREATE TABLE IF NOT EXISTS artifact_references (
reference        TEXT NOT NULL,
digest           TEXT NOT NULL,
size             INTEGER NOT NULL,
mime             TEXT NOT NULL,
bound_at         TEXT NOT NULL,
PRIMARY KEY(reference)
);

CREATE INDEX IF NOT EXISTS artifact_references_digest_ids ON artifact_references(digest);

"#;

/// Database References Helper
pub struct DBReferences;

impl DBReferences {

    /// Parse the database row
    fn parse(row: SqliteRow) -> Result<ReferenceRecord, CacheError> {
        let reference: String = row.try_get(0)?;
        let digest = Digest::parse(&row.try_get::<String, _>(1)?)
            .map_err(|e| e.with_context(format!("corrupt digest bound to {}", reference)))?;
        let bound_at = DateTime::parse_from_rfc3339(&row.try_get::<String, _>(4)?)
            .map_err(|e| CacheError::new(ErrorKind::SQLError)
                .with_context(format!("corrupt timestamp bound to {}", reference)).with_error(e.to_string()))?
            .with_timezone(&Utc);

        Ok(ReferenceRecord::new(reference, digest, row.try_get(2)?, row.try_get(3)?, bound_at))
    }

    /// Creates the database table
    pub async fn create_table(pool: &SqlitePool) -> Result<(), CacheError> {
        pool.execute(REFERENCES_TABLE).await
            .map_err(|e| CacheError::from(e).with_context("Failed to create the 'artifact_references' table"))?;
        Ok(())
    }

    /// Return an optional reference record
    pub async fn record_for_reference(pool: &SqlitePool, reference: &str) -> Result<Option<ReferenceRecord>, CacheError> {

        let row = sqlx::query(REFERENCE_RECORD)
            .bind(reference)
            .fetch_optional(pool).await?;

        row.map(DBReferences::parse).transpose()
    }

    /// Deletes an entry in the references table
    #[cfg(test)]
    pub async fn delete(pool: &SqlitePool, reference: &str) -> Result<u64, CacheError> {

        // Build the query
        let query = sqlx::query(REFERENCE_DELETE_QUERY)
            .bind(reference)
            .execute(pool);

        // Execute it
        Ok(query.await?.rows_affected())
    }

    /// Upsert a reference binding
    pub async fn upsert(pool: &SqlitePool, record: &ReferenceRecord) -> Result<u64, CacheError> {

        let query = sqlx::query(REFERENCE_UPSERT_QUERY)
            .bind(&record.reference)
            .bind(record.digest.to_string())
            .bind(record.size)
            .bind(&record.mime)
            .bind(record.bound_at.to_rfc3339());

        Ok(query.execute(pool).await?.rows_affected())
    }

    /// Delete all bindings (used for testing purposes only)
    #[cfg(test)]
    pub async fn delete_all(pool: &SqlitePool) -> Result<u64, CacheError> {

        let total = sqlx::query(REFERENCE_DELETE_ALL).execute(pool)
            .await?.rows_affected();

        Ok(total)

    }
}
