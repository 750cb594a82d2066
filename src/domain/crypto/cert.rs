use std::fmt;

use der::Decode;

use crate::infra::error::{SigningError, SigningResult};

/// DER-encoded signing certificate.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Box<[u8]>,
}

/// Ordered certificate chain (leaf first, then intermediates). Root excluded.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CertificateChain {
    certificates: Vec<Certificate>,
}

impl Certificate {
    #[must_use]
    pub fn from_der(der: Vec<u8>) -> Self {
        Self {
            der: der.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Subject distinguished name, e.g. `CN=Jane Doe,O=Example`.
    pub fn subject(&self) -> SigningResult<String> {
        let parsed = x509_cert::Certificate::from_der(&self.der)
            .map_err(|e| SigningError::KeyError(format!("Malformed certificate: {e}")))?;
        Ok(parsed.tbs_certificate.subject.to_string())
    }
}

impl CertificateChain {
    #[must_use]
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    #[must_use]
    pub fn leaf(&self) -> Option<&Certificate> {
        self.certificates.first()
    }

    #[must_use]
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Certificate(len={})", self.der.len())
    }
}

impl fmt::Debug for CertificateChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CertificateChain(len={})", self.certificates.len())
    }
}
