// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use crate::models::types::{Annotations, BlobSize, MimeType};
use crate::registry::digest::Digest;

/// Annotation holding the logical file name of a descriptor
pub const ANNOTATION_TITLE: &str = "org.opencontainers.image.title";

/// Descriptor is one node (manifest, config or layer) of an artifact content graph
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: MimeType,

    pub digest: Digest,

    pub size: BlobSize,

    // Logical file name, empty for root and intermediate nodes
    #[serde(skip)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Descriptor {
    pub fn new(digest: Digest, size: BlobSize, media_type: &str) -> Descriptor {
        Descriptor {
            media_type: media_type.to_string(),
            digest,
            size,
            name: String::new(),
            annotations: Annotations::default(),
        }
    }

    /// Attach an annotation, the title annotation also names the descriptor
    pub fn with_annotation(mut self, key: &str, value: &str) -> Descriptor {
        self.annotations.insert(key.to_string(), value.to_string());
        self.resolve_name();
        self
    }

    /// Derive the name from the title annotation
    pub fn resolve_name(&mut self) {
        self.name = self.annotations.get(ANNOTATION_TITLE).cloned().unwrap_or_default();
    }
}

/// A root descriptor and its children in manifest order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorGraph {
    pub root: Descriptor,
    pub children: Vec<Descriptor>,
}

impl DescriptorGraph {
    pub fn new(root: Descriptor, children: Vec<Descriptor>) -> DescriptorGraph {
        DescriptorGraph { root, children }
    }
}
