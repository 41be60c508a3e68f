/// Reference identifies an artifact on a remote registry: `host/repo:tag` or `host/repo@digest`.
/// Repository naming follows the distribution spec:
/// https://github.com/opencontainers/distribution-spec/blob/master/spec.md#overview
/// 1. A repository name is broken up into path components.
/// 2. A component of a repository name MUST begin with one or more lowercase alpha-numeric characters.
/// 3. Subsequent lowercase alpha-numeric characters are OPTIONAL and MAY be separated by periods, dashes or underscores.
/// More strictly, it MUST match the regular expression [a-z0-9]+(?:[._-][a-z0-9]+)*.

// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;

use serde::{Deserialize, Serialize};
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;
use crate::registry::digest::Digest;

lazy_static! {
    static ref REGEX_COMPONENT: Regex = Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*$").unwrap();
    static ref REGEX_TAG: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").unwrap();
}

const DEFAULT_TAG: &str = "latest";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    // Registry host, optionally with a port
    pub host: String,

    // This is the whole repository name(space) without the host
    pub name: String,

    // The parsed namespace
    #[serde(default)]
    pub components: Vec<String>,

    // The tag, when the reference is not pinned to a digest
    #[serde(default)]
    pub tag: Option<String>,

    // If the reference is a digest then it's also parsed
    #[serde(default)]
    pub digest: Option<Digest>,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.digest, &self.tag) {
            (Some(digest), _) => write!(f, "{}/{}@{}", self.host, self.name, digest),
            (None, Some(tag)) => write!(f, "{}/{}:{}", self.host, self.name, tag),
            (None, None) => write!(f, "{}/{}:{}", self.host, self.name, DEFAULT_TAG),
        }
    }
}

impl Reference {

    /// Parse a full reference string
    pub fn parse(reference: &str) -> Result<Reference, CacheError> {
        // split off the digest first, it contains a `:` of its own
        let (remainder, digest) = match reference.split_once('@') {
            Some((remainder, digest)) => (remainder, Some(Digest::parse(digest)?)),
            None => (reference, None),
        };

        // the tag is whatever follows the last `:` after the last `/`,
        // a `:` before that belongs to the host port
        let last_slash = remainder.rfind('/').unwrap_or(0);
        let (locator, tag) = match remainder[last_slash..].rfind(':') {
            Some(idx) => {
                let idx = last_slash + idx;
                (&remainder[..idx], Some(remainder[idx + 1..].to_string()))
            }
            None => (remainder, None),
        };

        if let Some(ref tag) = tag {
            if !REGEX_TAG.is_match(tag) {
                return Err(CacheError::new(ErrorKind::NameInvalid)
                    .with_context(format!("invalid reference {}", reference))
                    .with_error(format!("tag is invalid: {}", tag)));
            }
        }

        let Some((host, name)) = locator.split_once('/') else {
            return Err(CacheError::new(ErrorKind::NameInvalid)
                .with_context(format!("invalid reference {}", reference))
                .with_error("reference must be of the form host/repository[:tag|@digest]"));
        };

        if host.is_empty() {
            return Err(CacheError::new(ErrorKind::NameInvalid)
                .with_context(format!("invalid reference {}", reference))
                .with_error("registry host is empty"));
        }

        let components = Reference::parse_name(name)?;

        // a digest pins the content, the tag is then informational only
        let tag = if digest.is_some() { None } else { Some(tag.unwrap_or_else(|| DEFAULT_TAG.to_string())) };

        Ok(Reference {
            host: host.to_string(),
            name: name.to_string(),
            components,
            tag,
            digest,
        })
    }

    /// What the registry API expects in the manifests path: the digest or the tag
    pub fn api_reference(&self) -> String {
        match (&self.digest, &self.tag) {
            (Some(digest), _) => digest.to_string(),
            (None, Some(tag)) => tag.clone(),
            (None, None) => DEFAULT_TAG.to_string(),
        }
    }

    /// Validate the repository name and split it into components
    fn parse_name(name: &str) -> Result<Vec<String>, CacheError> {
        // check that the maximum amount of chars for the name is 255
        if name.len() > 255 {
            return Err(CacheError::new(ErrorKind::NameInvalid).with_error(format!(
                "Repository name max length should be less than 255 chars - we got: {}",
                name.len()
            )));
        }

        // split the repository name into components via the: `/` char
        let components = name
            .split('/')
            .map(String::from)
            .collect::<Vec<String>>();

        // verify now that each component is valid
        for component in &components {
            if !REGEX_COMPONENT.is_match(component) {
                return Err(CacheError::new(ErrorKind::NameInvalid).with_error(format!(
                    "Repository component is invalid: {}",
                    &name
                )));
            }
        }

        Ok(components)
    }
}
