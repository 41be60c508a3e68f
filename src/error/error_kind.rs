// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use serde::{Deserialize, Serialize};

const VALIDATION_ERROR:&str = "VALIDATION_ERROR";
const NOT_STORED:&str = "NOT_STORED";
const MANIFEST_CORRUPT:&str = "MANIFEST_CORRUPT";
const DIGEST_MISMATCH:&str = "DIGEST_MISMATCH";
const DIGEST_INVALID:&str = "DIGEST_INVALID";
const NAME_INVALID:&str = "NAME_INVALID";
const BLOB_UNKNOWN:&str = "BLOB_UNKNOWN";
const IO_ERROR:&str = "IO_ERROR";
const SQL_ERROR:&str = "SQL_ERROR";
const JSON_ERROR:&str = "JSON_ERROR";
const CONFIG_ERROR: &str = "CONFIG_ERROR";
const UPSTREAM_ERROR:&str = "UPSTREAM_ERROR";

/// Enum representing the various kinds of cache errors
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorKind {

    /// The caller supplied an inconsistent set of options, detected before any I/O
    Validation,

    /// The reference has no digest bound in the reference index
    NotStored,

    /// The stored manifest bytes could not be decoded, or do not hash to their digest
    CorruptManifest,

    /// Content written under a digest does not hash to that digest
    DigestMismatch,

    /// Invalid digest
    DigestInvalid,

    /// Invalid reference or repository name
    NameInvalid,

    /// The blob is not present in the content store
    BlobUnknown,

    // =============================================================================================

    /// Filesystem error
    IOError,

    /// SQLError error
    SQLError,

    /// Json Serialization/DeSerialization error
    JSONError,

    /// Error loading config
    ConfigError,

    /// The remote registry returned an error or could not be reached
    UpstreamError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        let kind = match *self {
            ErrorKind::Validation => VALIDATION_ERROR,
            ErrorKind::NotStored => NOT_STORED,
            ErrorKind::CorruptManifest => MANIFEST_CORRUPT,
            ErrorKind::DigestMismatch => DIGEST_MISMATCH,
            ErrorKind::DigestInvalid => DIGEST_INVALID,
            ErrorKind::NameInvalid => NAME_INVALID,
            ErrorKind::BlobUnknown => BLOB_UNKNOWN,
            ErrorKind::IOError => IO_ERROR,
            ErrorKind::SQLError => SQL_ERROR,
            ErrorKind::JSONError => JSON_ERROR,
            ErrorKind::ConfigError => CONFIG_ERROR,
            ErrorKind::UpstreamError => UPSTREAM_ERROR,
        };

        write!(f, "{}", kind)
    }
}
