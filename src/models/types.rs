// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;

/// Content media type, e.g. application/vnd.oci.image.layer.v1.tar
pub type MimeType = String;

/// Byte length of a blob as recorded in a descriptor
pub type BlobSize = i64;

/// Key unique, order irrelevant string metadata attached to a descriptor
pub type Annotations = BTreeMap<String, String>;

/// Required annotation key/value pairs, empty means match everything
pub type PredicateSet = BTreeMap<String, String>;
