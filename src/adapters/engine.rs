//! Signature format engine seam.
//!
//! The cryptographic container formats (XAdES, CAdES, PAdES and their ASiC
//! variants) are produced by an external engine. The job only ever calls
//! the two phases below, in order, with the same document and profile.

use std::sync::Arc;

use crate::domain::crypto::SignatureValue;
use crate::domain::document::Document;
use crate::domain::parameters::{BoundProfile, SignatureFamily};
use crate::infra::error::SigningResult;

/// Two-phase signature engine for one or more signature families.
#[cfg_attr(test, mockall::automock)]
pub trait SignatureEngine: Send + Sync {
    /// Bytes the signing key has to sign.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError` if the engine rejects the document or profile.
    fn compute_data_to_sign(
        &self,
        document: &Document,
        profile: &BoundProfile,
    ) -> SigningResult<Vec<u8>>;

    /// Build the signed document from the signature value.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError` if the signature cannot be assembled.
    fn assemble(
        &self,
        document: &Document,
        profile: &BoundProfile,
        signature: &SignatureValue,
    ) -> SigningResult<Document>;
}

/// One engine per signature family.
#[derive(Clone)]
pub struct SignatureEngines {
    xades: Arc<dyn SignatureEngine>,
    cades: Arc<dyn SignatureEngine>,
    pades: Arc<dyn SignatureEngine>,
}

impl SignatureEngines {
    #[must_use]
    pub fn new(
        xades: Arc<dyn SignatureEngine>,
        cades: Arc<dyn SignatureEngine>,
        pades: Arc<dyn SignatureEngine>,
    ) -> Self {
        Self {
            xades,
            cades,
            pades,
        }
    }

    /// Use a single engine for every family.
    #[must_use]
    pub fn uniform(engine: Arc<dyn SignatureEngine>) -> Self {
        Self {
            xades: Arc::clone(&engine),
            cades: Arc::clone(&engine),
            pades: engine,
        }
    }

    #[must_use]
    pub fn for_family(&self, family: SignatureFamily) -> &dyn SignatureEngine {
        match family {
            SignatureFamily::Xades => self.xades.as_ref(),
            SignatureFamily::Cades => self.cades.as_ref(),
            SignatureFamily::Pades => self.pades.as_ref(),
        }
    }
}
