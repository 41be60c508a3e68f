// SPDX-License-Identifier: Apache-2.0
use chrono::{DateTime, Utc};
use crate::models::types::{BlobSize, MimeType};
use crate::registry::digest::Digest;

/// ReferenceRecord keeps an index between an artifact reference and its root manifest digest
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub reference: String,
    pub digest: Digest,
    pub size: BlobSize,
    pub mime: MimeType,
    pub bound_at: DateTime<Utc>,
}

impl ReferenceRecord {
    pub fn new(reference: String, digest: Digest, size: BlobSize, mime: MimeType, bound_at: DateTime<Utc>) -> ReferenceRecord {
        ReferenceRecord {
            reference,
            digest,
            size,
            mime,
            bound_at
        }
    }
}
