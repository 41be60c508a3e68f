// SPDX-License-Identifier: Apache-2.0
use lazy_static::lazy_static;
use regex::Regex;
use std::str::FromStr;
use std::fmt;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Sha256, Sha512};
use sha2::Digest as Sha2Digest;
use crate::error::error_kind::ErrorKind;
use crate::error::cache::CacheError;

// These regex are used to do a simple validation of the digest fields
lazy_static! {
    static ref REGEX_ALGO: Regex = Regex::new(r"^[A-Za-z0-9_+.-]+$").unwrap();
    static ref REGEX_DIGEST: Regex = Regex::new(r"^[a-f0-9]+$").unwrap();
}

#[derive(Hash, Serialize, Deserialize, Debug, Clone, Copy, PartialOrd, Ord, Eq, PartialEq, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Length of the hex encoded hash
    fn hex_len(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha256" => Ok(DigestAlgorithm::Sha256),
            "sha512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(format!("'{}' is not a valid DigestAlgorithm", s)),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestAlgorithm::Sha256 => write!(f, "sha256"),
            DigestAlgorithm::Sha512 => write!(f, "sha512"),
        }
    }
}

/// This contains the algorithm and the hashed value
#[derive(Debug, PartialEq, Clone, PartialOrd, Ord, Eq, Hash)]
pub struct Digest {
    pub algo: DigestAlgorithm,
    pub hash: String,
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.algo, self.hash)
    }
}

impl FromStr for Digest {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Digest::parse(s)
    }
}

/// Implemented custom deserializer from string
impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        let s = String::deserialize(deserializer)?;
        Digest::parse(s.as_str()).map_err(|e| de::Error::custom(format!("error parsing digest: {}", e)))
    }
}

/// Implemented custom serializer to the algo:hash string
impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl Digest {

    /// Parse the digest with the form: algo:hash
    pub fn parse(component: &str) -> Result<Digest, CacheError> {
        Digest::parse_parts(component).map_err(|e|
            CacheError::new(ErrorKind::DigestInvalid)
                .with_context(format!("failed to parse digest {}", component)).with_error(e))
    }

    /// Hash the content with the given algorithm
    pub fn compute(algo: DigestAlgorithm, data: &[u8]) -> Digest {
        let hash = match algo {
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
            DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
        };
        Digest { algo, hash }
    }

    /// Whether the content hashes to this digest
    pub fn verify(&self, data: &[u8]) -> bool {
        Digest::compute(self.algo, data) == *self
    }

    // =============================================================================================
    // Private functions

    /// Parses and validates both parts: algo and hash
    fn parse_parts(component: &str) -> Result<Digest, String> {
        let Some((algo, hash)) = component.split_once(':') else {
            return Err(format!("component cannot be parsed into a digest: {}", component));
        };

        if !REGEX_ALGO.is_match(algo) {
            return Err(format!("wrong digest algorithm: {}", algo));
        }

        if !REGEX_DIGEST.is_match(hash) {
            return Err(format!("wrong digest format: {}", hash));
        }

        let algo = DigestAlgorithm::from_str(algo)?;

        if hash.len() != algo.hex_len() {
            return Err(format!("{} digest must be {} hex characters, got {}", algo, algo.hex_len(), hash.len()));
        }

        Ok(Digest {
            algo,
            hash: hash.to_string(),
        })
    }
}
