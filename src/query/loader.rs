// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use crate::driver::ContentStore;
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::models::descriptor::{Descriptor, DescriptorGraph};
use crate::models::manifest::Manifest;
use crate::registry::digest::Digest;

/// Expands a root manifest into its descriptor graph. Children are read from the
/// descriptors embedded in the manifest, their blobs are never fetched.
#[derive(Clone)]
pub struct DescriptorLoader {
    store: Arc<dyn ContentStore>
}

impl DescriptorLoader {
    pub fn new(store: Arc<dyn ContentStore>) -> DescriptorLoader {
        DescriptorLoader { store }
    }

    pub async fn load(&self, root_digest: &Digest) -> Result<DescriptorGraph, CacheError> {
        let data = self.store.get(root_digest).await?;

        // The store may have been tampered with behind our back
        if !root_digest.verify(&data) {
            return Err(CacheError::new(ErrorKind::CorruptManifest)
                .with_context(format!("manifest {} is corrupt", root_digest))
                .with_error("stored content does not match its digest"));
        }

        let manifest: Manifest = serde_json::from_slice(&data).map_err(|e| CacheError::new(ErrorKind::CorruptManifest)
            .with_context(format!("failed to decode manifest {}", root_digest))
            .with_error(e.to_string()))?;

        let mut root = Descriptor::new(root_digest.clone(), data.len() as i64, &manifest.media_type());
        root.annotations = manifest.annotations.clone();

        let children = manifest.into_children();
        tracing::debug!("Loaded manifest {} with {} children", root_digest, children.len());

        Ok(DescriptorGraph::new(root, children))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use bytes::Bytes;
    use crate::driver::ContentStore;
    use crate::error::error_kind::ErrorKind;
    use crate::models::manifest::MEDIA_TYPE_OCI_MANIFEST;
    use crate::query::fixtures::{layer, manifest_bytes};
    use crate::query::loader::DescriptorLoader;
    use crate::registry::digest::{Digest, DigestAlgorithm};
    use crate::repository::memory::MemoryStorage;

    #[tokio::test]
    async fn load_in_manifest_order_test() {
        let store = Arc::new(MemoryStorage::new());
        let layers = vec![
            layer(b"c", "c.txt", &[("tier", "1")]),
            layer(b"a", "a.txt", &[]),
            layer(b"b", "", &[("tier", "1")]),
        ];
        let data = manifest_bytes(&layers);
        let digest = Digest::compute(DigestAlgorithm::Sha256, &data);
        store.put(&digest, data.clone()).await.expect("Failed to put manifest");

        let graph = DescriptorLoader::new(store).load(&digest).await.expect("Failed to load graph");
        assert_eq!(digest, graph.root.digest);
        assert_eq!(data.len() as i64, graph.root.size);
        assert_eq!(MEDIA_TYPE_OCI_MANIFEST, graph.root.media_type);
        assert_eq!("", graph.root.name);

        let names: Vec<&str> = graph.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(vec!["c.txt", "a.txt", ""], names);
        assert_eq!(layers, graph.children);
    }

    #[tokio::test]
    async fn load_empty_manifest_test() {
        let store = Arc::new(MemoryStorage::new());
        let data = manifest_bytes(&[]);
        let digest = Digest::compute(DigestAlgorithm::Sha256, &data);
        store.put(&digest, data).await.expect("Failed to put manifest");

        let graph = DescriptorLoader::new(store).load(&digest).await.expect("Failed to load graph");
        assert!(graph.children.is_empty());
    }

    #[tokio::test]
    async fn load_malformed_manifest_test() {
        let store = Arc::new(MemoryStorage::new());
        let data = Bytes::from_static(b"{\"schemaVersion\": 2, \"layers\": [{\"digest\": 12}]}");
        let digest = Digest::compute(DigestAlgorithm::Sha256, &data);
        store.put(&digest, data).await.expect("Failed to put manifest");

        let err = DescriptorLoader::new(store).load(&digest).await.expect_err("manifest should be corrupt");
        assert_eq!(ErrorKind::CorruptManifest, err.kind);
        assert!(err.to_string().starts_with(&format!("failed to decode manifest {}: ", digest)));
    }

    #[tokio::test]
    async fn load_tampered_manifest_test() {
        let store = Arc::new(MemoryStorage::new());
        let data = manifest_bytes(&[layer(b"a", "a.txt", &[])]);
        let digest = Digest::compute(DigestAlgorithm::Sha256, &data);
        store.corrupt(&digest, manifest_bytes(&[]));

        let err = DescriptorLoader::new(store).load(&digest).await.expect_err("manifest should be corrupt");
        assert_eq!(ErrorKind::CorruptManifest, err.kind);
    }

    #[tokio::test]
    async fn load_missing_manifest_test() {
        let store = Arc::new(MemoryStorage::new());
        let digest = Digest::compute(DigestAlgorithm::Sha256, b"missing");

        let err = DescriptorLoader::new(store).load(&digest).await.expect_err("manifest should be missing");
        assert_eq!(ErrorKind::BlobUnknown, err.kind);
    }
}
