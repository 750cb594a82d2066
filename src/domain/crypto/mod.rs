//! Cryptographic value types exchanged with signing keys and signature engines.
//!
//! Provides strongly-typed wrappers for:
//! - Digest algorithms with their OIDs and SHA-2 implementations
//! - Signing certificates and ordered chains
//! - Raw signature values returned by a key
//!
//! The actual signature primitives live behind the adapter traits; these
//! types only carry bytes between them.

mod cert;
mod digest;
mod signature;

pub use cert::{Certificate, CertificateChain};
pub use digest::DigestAlgorithm;
pub use signature::SignatureValue;
