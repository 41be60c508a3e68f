// SPDX-License-Identifier: Apache-2.0
use async_trait::async_trait;
use bytes::Bytes;
use crate::error::cache::CacheError;
use crate::models::reference_record::ReferenceRecord;
use crate::models::types::MimeType;
use crate::registry::digest::Digest;
use crate::registry::reference::Reference;

/// Interface for reading and storing content addressed blobs
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Whether a blob is stored under the digest, no side effects
    async fn has(&self, digest: &Digest) -> Result<bool, CacheError>;

    /// The raw stored bytes, ErrorKind::BlobUnknown when absent
    async fn get(&self, digest: &Digest) -> Result<Bytes, CacheError>;

    /// Store the bytes under their digest. Idempotent for identical content,
    /// content that does not hash to the digest is rejected with ErrorKind::DigestMismatch
    async fn put(&self, digest: &Digest, data: Bytes) -> Result<(), CacheError>;
}

/// Interface for the reference to root digest bindings
#[async_trait]
pub trait ReferenceIndex: Send + Sync {
    /// The root digest bound to the reference, ErrorKind::NotStored when absent
    async fn resolve(&self, reference: &str) -> Result<Digest, CacheError>;

    /// Bind the reference to the root descriptor, last write wins
    async fn bind(&self, record: ReferenceRecord) -> Result<(), CacheError>;
}

/// A manifest as served by the remote registry
#[derive(Debug, Clone)]
pub struct FetchedManifest {
    /// The digest announced by the registry, if any
    pub digest: Option<Digest>,
    pub mime: MimeType,
    pub data: Bytes,
}

/// Interface to the remote registry the cache is populated from
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch the manifest the reference points at
    async fn fetch_manifest(&self, reference: &Reference) -> Result<FetchedManifest, CacheError>;

    /// Fetch a blob of the reference repository
    async fn fetch_blob(&self, reference: &Reference, digest: &Digest) -> Result<Bytes, CacheError>;
}
