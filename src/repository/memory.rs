// SPDX-License-Identifier: Apache-2.0
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use crate::driver::{ContentStore, ReferenceIndex};
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::models::reference_record::ReferenceRecord;
use crate::registry::digest::Digest;

/// In memory content store and reference index, counts every call so tests can
/// assert that nothing was touched
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<Digest, Bytes>>,
    references: RwLock<HashMap<String, Digest>>,
    calls: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    /// Number of store and index operations served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Overwrite a blob without any verification
    pub fn corrupt(&self, digest: &Digest, data: Bytes) {
        self.blobs.write().insert(digest.clone(), data);
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for MemoryStorage {
    async fn has(&self, digest: &Digest) -> Result<bool, CacheError> {
        self.count();
        Ok(self.blobs.read().contains_key(digest))
    }

    async fn get(&self, digest: &Digest) -> Result<Bytes, CacheError> {
        self.count();
        self.blobs.read().get(digest).cloned().ok_or_else(|| CacheError::new(ErrorKind::BlobUnknown)
            .with_context(format!("blob {} is not stored", digest)))
    }

    async fn put(&self, digest: &Digest, data: Bytes) -> Result<(), CacheError> {
        self.count();
        if !digest.verify(&data) {
            return Err(CacheError::new(ErrorKind::DigestMismatch)
                .with_context(format!("content does not match digest {}", digest)));
        }
        self.blobs.write().entry(digest.clone()).or_insert(data);
        Ok(())
    }
}

#[async_trait]
impl ReferenceIndex for MemoryStorage {
    async fn resolve(&self, reference: &str) -> Result<Digest, CacheError> {
        self.count();
        self.references.read().get(reference).cloned().ok_or_else(|| CacheError::not_stored(reference))
    }

    async fn bind(&self, record: ReferenceRecord) -> Result<(), CacheError> {
        self.count();
        self.references.write().insert(record.reference, record.digest);
        Ok(())
    }
}
