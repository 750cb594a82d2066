//! Document Signer Library
//!
//! Orchestrates signing of electronic documents as XAdES, CAdES or PAdES,
//! optionally inside an ASiC container, with human-readable previews and
//! XML data container (XDC) packing.
//!
//! The cryptographic formats, keys and result delivery are external
//! capabilities behind the traits in [`adapters`]. A [`SigningJob`] ties a
//! document, its resolved parameters and a responder together and drives
//! the two-phase protocol:
//!
//! ```text
//! pack (if requested) -> compute_data_to_sign -> key.sign -> assemble -> responder
//! ```

pub mod adapters;
pub mod domain;
pub mod infra;
pub mod pipelines;
pub mod services;

pub use adapters::{
    Responder, SaveFileResponder, SignRequestBody, SignatureEngine, SignatureEngines, SigningKey,
};
pub use domain::crypto::{Certificate, CertificateChain, DigestAlgorithm, SignatureValue};
pub use domain::document::{Document, SignedDocument};
pub use domain::failure::{Failure, FailureKind};
pub use domain::mime::MimeType;
pub use domain::parameters::{
    AsicContainer, BoundProfile, DataContainerProfile, Packaging, SignatureFamily,
    SignatureLevel, SignatureProfile, SigningParameters,
};
pub use infra::config::{ConfigManager, ExportFormat, SignerConfiguration};
pub use infra::error::{SigningError, SigningResult};
pub use pipelines::{sign_in_background, JobOutcome, SigningJob};
pub use services::{
    classify, pack, resolve, DocumentClass, PackMode, RawSigningParameters, ResolverDefaults,
    StylesheetProcessor, TransformationEngine,
};
