//! Signing key seam.
//!
//! Implemented by whatever holds the private key: a smart card, an HSM or a
//! software keystore. `sign` is the only step of a job that may block on
//! user interaction (PIN entry) or a device round trip.

use tokio_util::sync::CancellationToken;

use crate::domain::crypto::{Certificate, CertificateChain, DigestAlgorithm, SignatureValue};
use crate::infra::error::SigningResult;

#[cfg_attr(test, mockall::automock)]
pub trait SigningKey: Send + Sync {
    /// Signing certificate.
    fn certificate(&self) -> Certificate;

    /// Leaf-first certificate chain.
    fn certificate_chain(&self) -> CertificateChain;

    /// Sign `data` with `digest` as the message digest algorithm.
    ///
    /// Implementations should watch `cancel` while waiting on the device and
    /// return `SigningCancelled` once it fires.
    ///
    /// # Errors
    ///
    /// Returns `KeyError` on device or token failure and `SigningCancelled`
    /// when the operation was aborted.
    fn sign(
        &self,
        data: &[u8],
        digest: DigestAlgorithm,
        cancel: &CancellationToken,
    ) -> SigningResult<SignatureValue>;

    /// Abort an in-flight `sign` call, if the device supports it.
    fn cancel(&self) {}
}
