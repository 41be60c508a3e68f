// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use serde::{Deserialize, Serialize};
use crate::error::error_kind::ErrorKind;

/// Manages the cache internal errors, that can be logged
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CacheError {
    /// The kind of error
    pub kind: ErrorKind,

    /// General description of the error
    pub message: String,

    /// The original error we might want to log
    pub error: String,
}

impl fmt::Debug for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CacheError {{ kind: ErrorKind::{:#?}, message: {:?}, error: {:?} }}",
            self.kind, self.message, self.error
        )
    }
}

/// The display string is what the user sees, so it never carries the kind code
impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.message.is_empty(), self.error.is_empty()) {
            (true, true) => write!(f, "{}", self.kind),
            (false, true) => write!(f, "{}", self.message),
            (true, false) => write!(f, "{}", self.error),
            (false, false) => write!(f, "{}: {}", self.message, self.error),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<ErrorKind> for CacheError {
    fn from(kind: ErrorKind) -> CacheError {
        CacheError::new(kind)
    }
}

/// Converts from serde_json::Error to module error
impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> CacheError {
        CacheError::new(ErrorKind::JSONError)
            .with_context("failed to serialize/deserialize object")
            .with_error(e.to_string())
    }
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> CacheError {
        CacheError::new(ErrorKind::SQLError)
            .with_context("reference index query failed")
            .with_error(e.to_string())
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> CacheError {
        CacheError::new(ErrorKind::IOError).with_error(e.to_string())
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(e: reqwest::Error) -> CacheError {
        CacheError::new(ErrorKind::UpstreamError)
            .with_context("upstream request failed")
            .with_error(e.to_string())
    }
}

impl CacheError {

    /// Creates a new [`CacheError`](struct.CacheError.html)
    pub fn new(kind: ErrorKind) -> CacheError {
        CacheError { kind, message: Default::default(), error: Default::default() }
    }

    /// Reference has no bound digest
    pub fn not_stored(reference: &str) -> CacheError {
        CacheError::new(ErrorKind::NotStored)
            .with_context(format!("descriptor for reference {} is not stored", reference))
    }

    /// Adds additional context to the [`CacheError`](struct.CacheError.html). The context is the
    /// leading part of the display string
    pub fn with_context<S>(mut self, context: S) -> CacheError
        where
            S: AsRef<str>
    {
        self.message = context.as_ref().to_string();
        self
    }

    /// Add the original error as string to the CacheError
    pub fn with_error<S>(mut self, error: S) -> CacheError where S: AsRef<str> {
        self.error = error.as_ref().to_string();
        self
    }
}
