use std::fmt;

use super::DigestAlgorithm;

/// Raw signature value produced by a signing key.
#[derive(Clone, Eq, PartialEq)]
pub struct SignatureValue {
    algo: DigestAlgorithm, // digest algorithm the key was asked to use
    bytes: Box<[u8]>,
}

impl SignatureValue {
    #[must_use]
    pub fn new(algo: DigestAlgorithm, bytes: Vec<u8>) -> Self {
        Self {
            algo,
            bytes: bytes.into_boxed_slice(),
        }
    }
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algo
    }
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for SignatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignatureValue(algo={:?}, len={})",
            self.algo,
            self.bytes.len()
        )
    }
}
