// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use crate::models::descriptor::Descriptor;
use crate::models::types::{Annotations, MimeType};

pub const MEDIA_TYPE_OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const MEDIA_TYPE_OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";
pub const MEDIA_TYPE_DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const MEDIA_TYPE_DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";

/// Everything we send in the Accept header when fetching a manifest
pub const MANIFEST_ACCEPT: [&str; 4] = [
    MEDIA_TYPE_OCI_MANIFEST,
    MEDIA_TYPE_OCI_INDEX,
    MEDIA_TYPE_DOCKER_MANIFEST,
    MEDIA_TYPE_DOCKER_MANIFEST_LIST,
];

/// Image manifest or image index as stored in the cache
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MimeType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Descriptor>,

    // Image manifest children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<Descriptor>>,

    // Image index children
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<Descriptor>>,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Manifest {

    /// The media type declared by the document, falling back on the OCI image manifest
    pub fn media_type(&self) -> MimeType {
        match self.media_type {
            Some(ref mime) => mime.clone(),
            None if self.manifests.is_some() && self.layers.is_none() => MEDIA_TYPE_OCI_INDEX.to_string(),
            None => MEDIA_TYPE_OCI_MANIFEST.to_string(),
        }
    }

    /// The child descriptors in document order, named after their title annotation
    pub fn into_children(self) -> Vec<Descriptor> {
        let mut children = match (self.layers, self.manifests) {
            (Some(layers), _) => layers,
            (None, Some(manifests)) => manifests,
            (None, None) => Vec::new(),
        };

        for child in children.iter_mut() {
            child.resolve_name();
        }

        children
    }
}
