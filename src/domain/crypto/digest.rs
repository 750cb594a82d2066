//! Digest algorithm domain type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::infra::error::SigningError;

/// Digest algorithms accepted for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DigestAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    #[must_use]
    pub fn digest_size(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// `urn:oid` form used in XML references.
    #[must_use]
    pub fn oid_urn(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "urn:oid:2.16.840.1.101.3.4.2.1",
            DigestAlgorithm::Sha384 => "urn:oid:2.16.840.1.101.3.4.2.2",
            DigestAlgorithm::Sha512 => "urn:oid:2.16.840.1.101.3.4.2.3",
        }
    }

    /// Hash `data` with this algorithm.
    ///
    /// Keys that only sign prehashed input (smart cards, HSMs) use this to
    /// reduce the data-to-sign before the device call.
    #[must_use]
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Ok(DigestAlgorithm::Sha256),
            "SHA384" => Ok(DigestAlgorithm::Sha384),
            "SHA512" => Ok(DigestAlgorithm::Sha512),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported digest algorithm: {s}"
            ))),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
