// SPDX-License-Identifier: Apache-2.0
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use crate::config::app::StorageConfig;
use crate::driver::ContentStore;
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::registry::digest::Digest;

const BLOBS_FOLDER:&str = "blobs";

// Distinguishes the tmp files of concurrent writers within the process
static TMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Content store backed by a folder: <folder>/blobs/<algo>/<hash>
#[derive(Clone, Debug)]
pub struct FilesystemStorage {
    folder: PathBuf
}

#[async_trait]
impl ContentStore for FilesystemStorage {

    async fn has(&self, digest: &Digest) -> Result<bool, CacheError> {
        Ok(tokio::fs::try_exists(self.blob_path(digest)).await?)
    }

    async fn get(&self, digest: &Digest) -> Result<Bytes, CacheError> {
        match tokio::fs::read(self.blob_path(digest)).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CacheError::new(ErrorKind::BlobUnknown)
                .with_context(format!("blob {} is not stored", digest))),
            Err(e) => Err(CacheError::from(e).with_context(format!("failed to read blob {}", digest))),
        }
    }

    async fn put(&self, digest: &Digest, data: Bytes) -> Result<(), CacheError> {

        // Calculate the digest to make sure the cached content is valid
        let algo = digest.algo;
        let content = data.clone();
        let blob_digest = tokio::task::spawn_blocking(move || Digest::compute(algo, &content)).await
            .map_err(|e| CacheError::new(ErrorKind::IOError)
                .with_context(format!("failed to calculate {} digest", algo)).with_error(e.to_string()))?;

        // Writing other content under an existing digest is rejected, never overwritten
        if blob_digest != *digest {
            tracing::error!("Digest mismatch {} - {}", blob_digest, digest);
            return Err(CacheError::new(ErrorKind::DigestMismatch)
                .with_context(format!("content does not match digest {}", digest))
                .with_error(format!("calculated {}", blob_digest)));
        }

        // Same digest, same content: nothing to do
        if self.has(digest).await? {
            tracing::debug!("Blob already stored: {}", digest);
            return Ok(());
        }

        let file_path_final = self.blob_path(digest);
        let file_path_tmp = self.blob_path_tmp(digest);

        if let Some(parent) = file_path_final.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if let Err(e) = self.write_tmp(&file_path_tmp, &data).await {
            tracing::error!("Failed to persist blob {}: {}", digest, e);
            if let Err(e) = tokio::fs::remove_file(&file_path_tmp).await {
                tracing::warn!("Failed to remove partial blob {:?}: {}", file_path_tmp, e);
            }
            return Err(e);
        }

        // Readers only ever see the complete file
        FilesystemStorage::commit_tmp(&file_path_tmp, &file_path_final).await
            .map_err(|e| e.with_context(format!("failed to rename blob {}", digest)))?;

        tracing::info!("Blob stored in cache successfully: {}", digest);
        Ok(())
    }
}

impl FilesystemStorage {

    /// New instance of the FilesystemStorage rooted in the configured folder
    pub fn new(storage: &StorageConfig) -> FilesystemStorage {
        FilesystemStorage {
            folder: PathBuf::from(&storage.folder)
        }
    }

    /// Build the local blob path
    pub fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.folder.join(BLOBS_FOLDER).join(digest.algo.to_string()).join(&digest.hash)
    }

    fn blob_path_tmp(&self, digest: &Digest) -> PathBuf {
        let sequence = TMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.folder.join(BLOBS_FOLDER).join(digest.algo.to_string())
            .join(format!("{}_{}_{}_tmp", digest.hash, std::process::id(), sequence))
    }

    /// Write and sync the whole content to the tmp file
    async fn write_tmp(&self, file_path: &Path, data: &[u8]) -> Result<(), CacheError> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(file_path).await?;
        file.write_all(data).await?;
        file.sync_data().await?;
        Ok(())
    }

    /// Move the tmp file in place, the tmp file never outlives a failed rename
    async fn commit_tmp(file_path_tmp: &Path, file_path_final: &Path) -> Result<(), CacheError> {
        if let Err(e) = tokio::fs::rename(file_path_tmp, file_path_final).await {
            if let Err(e) = tokio::fs::remove_file(file_path_tmp).await {
                tracing::warn!("Failed to remove partial blob {:?}: {}", file_path_tmp, e);
            }
            return Err(CacheError::from(e));
        }
        Ok(())
    }
}
