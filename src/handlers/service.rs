// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use sqlx::SqlitePool;
use crate::config::app::AppConfig;
use crate::db::db_references::DBReferences;
use crate::db::pool::DBPool;
use crate::driver::ReferenceIndex;
use crate::error::cache::CacheError;
use crate::models::reference_record::ReferenceRecord;
use crate::registry::digest::Digest;

/// Reference index persisted in SQLite
pub struct ReferenceService {
    pool: SqlitePool
}

impl ReferenceService {
    pub async fn new(app_config: &AppConfig) -> Result<ReferenceService, CacheError> {
        Ok(ReferenceService {
            pool: DBPool::from_config(&app_config.db, &app_config.db_uri()).await?,
        })
    }

    #[cfg(test)]
    pub fn with_pool(pool: SqlitePool) -> ReferenceService {
        ReferenceService { pool }
    }
}

#[async_trait]
impl ReferenceIndex for ReferenceService {

    /// Get the root digest from a reference
    async fn resolve(&self, reference: &str) -> Result<Digest, CacheError> {
        match DBReferences::record_for_reference(&self.pool, reference).await? {
            Some(record) => Ok(record.digest),
            None => Err(CacheError::not_stored(reference)),
        }
    }

    /// Persists a link between a reference and a digest
    async fn bind(&self, record: ReferenceRecord) -> Result<(), CacheError> {
        DBReferences::upsert(&self.pool, &record).await?;
        tracing::debug!("Bound {} to {}", record.reference, record.digest);
        Ok(())
    }
}
