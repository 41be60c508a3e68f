// SPDX-License-Identifier: Apache-2.0
use std::sync::Arc;
use crate::driver::{ContentStore, ReferenceIndex};
use crate::error::cache::CacheError;
use crate::models::descriptor::Descriptor;
use crate::models::types::PredicateSet;
use crate::query::loader::DescriptorLoader;
use crate::query::matcher::matches;

/// Resolves a reference, loads its descriptor graph and filters the children by annotation.
/// Read only and stateless: concurrent calls need no coordination.
#[derive(Clone)]
pub struct QueryEngine {
    index: Arc<dyn ReferenceIndex>,
    loader: DescriptorLoader,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn ContentStore>, index: Arc<dyn ReferenceIndex>) -> QueryEngine {
        QueryEngine {
            index,
            loader: DescriptorLoader::new(store),
        }
    }

    /// The children of the artifact matching every predicate, in manifest order
    pub async fn list(&self, reference: &str, predicates: &PredicateSet) -> Result<Vec<Descriptor>, CacheError> {
        let root_digest = self.index.resolve(reference).await?;

        let graph = self.loader.load(&root_digest).await?;

        let total = graph.children.len();
        let matched: Vec<Descriptor> = graph.children.into_iter()
            .filter(|child| matches(&child.annotations, predicates))
            .collect();

        tracing::debug!("{} of {} descriptors of {} ({}) match {:?}", matched.len(), total, reference, root_digest, predicates);

        Ok(matched)
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use crate::error::error_kind::ErrorKind;
    use crate::models::types::PredicateSet;
    use crate::query::engine::QueryEngine;
    use crate::query::fixtures::{cache_artifact, layer, MEDIA_TYPE_LAYER};
    use crate::repository::memory::MemoryStorage;

    const REFERENCE: &str = "localhost:5001/success:latest";

    fn predicates(pairs: &[(&str, &str)]) -> PredicateSet {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn engine(storage: &Arc<MemoryStorage>) -> QueryEngine {
        QueryEngine::new(storage.clone(), storage.clone())
    }

    #[tokio::test]
    async fn single_layer_scenario_test() {
        let storage = Arc::new(MemoryStorage::new());
        let hello = layer(b"Hello World!\n", "hello.txt", &[("size", "small")]);
        cache_artifact(&*storage, &*storage, REFERENCE, &[hello.clone()]).await;
        let engine = engine(&storage);

        let small = engine.list(REFERENCE, &predicates(&[("size", "small")])).await.expect("Failed to list");
        assert_eq!(1, small.len());
        assert_eq!("hello.txt", small[0].name);
        assert_eq!("sha256:03ba204e50d126e4674c005e04d82e84c21366780af1f43bd54a37816b6ab340", small[0].digest.to_string());
        assert_eq!(13, small[0].size);
        assert_eq!(MEDIA_TYPE_LAYER, small[0].media_type);

        let large = engine.list(REFERENCE, &predicates(&[("size", "large")])).await.expect("Failed to list");
        assert!(large.is_empty());

        let all = engine.list(REFERENCE, &PredicateSet::new()).await.expect("Failed to list");
        assert_eq!(small, all);
    }

    #[tokio::test]
    async fn order_preserving_subsequence_test() {
        let storage = Arc::new(MemoryStorage::new());
        let layers = vec![
            layer(b"1", "one", &[("arch", "amd64"), ("os", "linux")]),
            layer(b"2", "two", &[("arch", "arm64"), ("os", "linux")]),
            layer(b"3", "three", &[("arch", "amd64")]),
            layer(b"4", "four", &[("arch", "amd64"), ("os", "linux")]),
            // Same content twice is listed twice
            layer(b"1", "one", &[("arch", "amd64"), ("os", "linux")]),
        ];
        cache_artifact(&*storage, &*storage, REFERENCE, &layers).await;
        let engine = engine(&storage);

        let all = engine.list(REFERENCE, &PredicateSet::new()).await.expect("Failed to list");
        assert_eq!(layers, all);

        let amd64_linux = engine.list(REFERENCE, &predicates(&[("arch", "amd64"), ("os", "linux")])).await.expect("Failed to list");
        let names: Vec<&str> = amd64_linux.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(vec!["one", "four", "one"], names);

        let amd64 = engine.list(REFERENCE, &predicates(&[("arch", "amd64")])).await.expect("Failed to list");
        let names: Vec<&str> = amd64.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(vec!["one", "three", "four", "one"], names);
    }

    #[tokio::test]
    async fn deterministic_test() {
        let storage = Arc::new(MemoryStorage::new());
        let layers: Vec<_> = (0..20)
            .map(|i| layer(format!("layer-{}", i).as_bytes(), &format!("file-{}", i), &[("even", if i % 2 == 0 { "yes" } else { "no" })]))
            .collect();
        cache_artifact(&*storage, &*storage, REFERENCE, &layers).await;
        let engine = engine(&storage);

        let filter = predicates(&[("even", "yes")]);
        let first = engine.list(REFERENCE, &filter).await.expect("Failed to list");
        let second = engine.list(REFERENCE, &filter).await.expect("Failed to list");
        assert_eq!(10, first.len());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn concurrent_list_test() {
        let storage = Arc::new(MemoryStorage::new());
        let layers = vec![layer(b"a", "a", &[("k", "v")]), layer(b"b", "b", &[])];
        cache_artifact(&*storage, &*storage, REFERENCE, &layers).await;
        let engine = engine(&storage);

        let handles: Vec<_> = (0..8).map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.list(REFERENCE, &predicates(&[("k", "v")])).await })
        }).collect();

        for handle in handles {
            let listed = handle.await.expect("task panicked").expect("Failed to list");
            assert_eq!(vec![layers[0].clone()], listed);
        }
    }

    #[tokio::test]
    async fn not_stored_test() {
        let storage = Arc::new(MemoryStorage::new());
        let engine = engine(&storage);

        let err = engine.list("localhost:5001/client-fake:latest", &PredicateSet::new()).await.expect_err("reference should not be stored");
        assert_eq!(ErrorKind::NotStored, err.kind);
        assert_eq!("descriptor for reference localhost:5001/client-fake:latest is not stored", err.to_string());
    }

    #[tokio::test]
    async fn corrupt_manifest_test() {
        let storage = Arc::new(MemoryStorage::new());
        let digest = cache_artifact(&*storage, &*storage, REFERENCE, &[layer(b"a", "a", &[])]).await;
        storage.corrupt(&digest, bytes::Bytes::from_static(b"not json"));
        let engine = engine(&storage);

        let err = engine.list(REFERENCE, &PredicateSet::new()).await.expect_err("manifest should be corrupt");
        assert_eq!(ErrorKind::CorruptManifest, err.kind);
    }

    #[tokio::test]
    async fn rebind_test() {
        let storage = Arc::new(MemoryStorage::new());
        cache_artifact(&*storage, &*storage, REFERENCE, &[layer(b"v1", "v1", &[])]).await;
        cache_artifact(&*storage, &*storage, REFERENCE, &[layer(b"v2", "v2", &[])]).await;
        let engine = engine(&storage);

        let listed = engine.list(REFERENCE, &PredicateSet::new()).await.expect("Failed to list");
        assert_eq!(1, listed.len());
        assert_eq!("v2", listed[0].name);
    }
}
