// SPDX-License-Identifier: Apache-2.0
use bytes::Bytes;
use chrono::Utc;
use crate::driver::{ContentStore, ReferenceIndex};
use crate::models::descriptor::{Descriptor, ANNOTATION_TITLE};
use crate::models::manifest::{Manifest, MEDIA_TYPE_OCI_MANIFEST};
use crate::models::reference_record::ReferenceRecord;
use crate::models::types::Annotations;
use crate::registry::digest::{Digest, DigestAlgorithm};

pub const MEDIA_TYPE_LAYER: &str = "application/vnd.oci.image.layer.v1.tar";
const MEDIA_TYPE_CONFIG: &str = "application/vnd.oci.image.config.v1+json";

/// Layer descriptor for the content, titled unless the title is empty
pub fn layer(content: &[u8], title: &str, annotations: &[(&str, &str)]) -> Descriptor {
    let mut descriptor = Descriptor::new(Digest::compute(DigestAlgorithm::Sha256, content), content.len() as i64, MEDIA_TYPE_LAYER);
    if !title.is_empty() {
        descriptor = descriptor.with_annotation(ANNOTATION_TITLE, title);
    }
    for (key, value) in annotations {
        descriptor = descriptor.with_annotation(key, value);
    }
    descriptor
}

/// Serialized image manifest with the given layers
pub fn manifest_bytes(layers: &[Descriptor]) -> Bytes {
    let manifest = Manifest {
        schema_version: 2,
        media_type: Some(MEDIA_TYPE_OCI_MANIFEST.to_string()),
        config: Some(Descriptor::new(Digest::compute(DigestAlgorithm::Sha256, b"{}"), 2, MEDIA_TYPE_CONFIG)),
        layers: Some(layers.to_vec()),
        manifests: None,
        annotations: Annotations::default(),
    };
    Bytes::from(serde_json::to_vec(&manifest).expect("Failed to serialize manifest"))
}

/// Store a manifest for the layers and bind the reference to it
pub async fn cache_artifact(store: &dyn ContentStore, index: &dyn ReferenceIndex, reference: &str, layers: &[Descriptor]) -> Digest {
    let data = manifest_bytes(layers);
    let digest = Digest::compute(DigestAlgorithm::Sha256, &data);
    let size = data.len() as i64;
    store.put(&digest, data).await.expect("Failed to store manifest");
    index.bind(ReferenceRecord::new(reference.to_string(), digest.clone(), size, MEDIA_TYPE_OCI_MANIFEST.to_string(), Utc::now()))
        .await.expect("Failed to bind reference");
    digest
}
