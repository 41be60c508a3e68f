// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use crate::driver::{ContentStore, ReferenceIndex, Upstream};
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::models::descriptor::Descriptor;
use crate::models::manifest::Manifest;
use crate::models::reference_record::ReferenceRecord;
use crate::registry::digest::{Digest, DigestAlgorithm};
use crate::registry::reference::Reference;

/// Populates the cache: manifest first, then the blobs it references, then the reference binding
pub struct PullHandler {
    upstream: Arc<dyn Upstream>,
    store: Arc<dyn ContentStore>,
    index: Arc<dyn ReferenceIndex>,
    concurrency: usize,
}

impl PullHandler {

    pub fn new(upstream: Arc<dyn Upstream>, store: Arc<dyn ContentStore>, index: Arc<dyn ReferenceIndex>) -> PullHandler {
        PullHandler {
            upstream,
            store,
            index,
            concurrency: num_cpus::get().max(1),
        }
    }

    /// Pull the artifact and bind the canonical reference to its manifest digest
    pub async fn pull(&self, reference: &Reference) -> Result<Digest, CacheError> {
        let fetched = self.upstream.fetch_manifest(reference).await?;

        // A pinned reference wins over whatever the registry announces
        let manifest_digest = match (&reference.digest, &fetched.digest) {
            (Some(pinned), _) => pinned.clone(),
            (None, Some(announced)) => announced.clone(),
            (None, None) => Digest::compute(DigestAlgorithm::Sha256, &fetched.data),
        };

        let manifest: Manifest = serde_json::from_slice(&fetched.data).map_err(|e| CacheError::new(ErrorKind::CorruptManifest)
            .with_context(format!("failed to decode manifest of {}", reference))
            .with_error(e.to_string()))?;

        let size = fetched.data.len() as i64;
        self.store.put(&manifest_digest, fetched.data).await
            .map_err(|e| e.with_context(format!("failed to store manifest of {}", reference)))?;

        // The config is not listed but belongs to the artifact
        let mut descriptors: Vec<Descriptor> = manifest.config.iter().cloned().collect();
        descriptors.extend(manifest.into_children());

        let stored: Vec<bool> = futures::stream::iter(descriptors.iter())
            .map(|descriptor| self.persist(reference, descriptor))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        tracing::info!("Pulled {}: {} blobs fetched, {} already cached", reference,
            stored.iter().filter(|fetched| **fetched).count(), stored.iter().filter(|fetched| !**fetched).count());

        // Only bind once everything the manifest points at is stored
        let record = ReferenceRecord::new(reference.to_string(), manifest_digest.clone(), size, fetched.mime, Utc::now());
        self.index.bind(record).await?;

        Ok(manifest_digest)
    }

    /// Store one blob unless present, returns whether it was fetched
    async fn persist(&self, reference: &Reference, descriptor: &Descriptor) -> Result<bool, CacheError> {
        if self.store.has(&descriptor.digest).await? {
            tracing::debug!("Blob already cached: {}", descriptor.digest);
            return Ok(false);
        }

        let data = self.upstream.fetch_blob(reference, &descriptor.digest).await?;

        if data.len() as i64 != descriptor.size {
            return Err(CacheError::new(ErrorKind::DigestMismatch)
                .with_context(format!("blob {} has the wrong size", descriptor.digest))
                .with_error(format!("expected {} bytes, got {}", descriptor.size, data.len())));
        }

        self.store.put(&descriptor.digest, data).await?;
        Ok(true)
    }
}
