//! `SigningJob` drives one document through preview and two-phase signing.
//!
//! ```text
//! Created -> (Previewing)* -> Signing -> Signed | Failed
//! ```
//!
//! Previews borrow the job and can run any number of times. Signing
//! consumes it, so a job can be signed at most once; a retry builds a new
//! job from the same inputs. The responder hears exactly one outcome.

use std::fmt;
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::adapters::engine::SignatureEngines;
use crate::adapters::key::SigningKey;
use crate::adapters::responder::{signed_extension, Responder, SaveFileResponder};
use crate::domain::crypto::DigestAlgorithm;
use crate::domain::document::{Document, SignedDocument};
use crate::domain::failure::{Failure, FailureKind};
use crate::domain::mime::MimeType;
use crate::domain::parameters::{BoundProfile, SignatureFamily, SignatureProfile, SigningParameters};
use crate::infra::config::SignerConfiguration;
use crate::infra::error::{SigningError, SigningResult};
use crate::services::classifier::{classify, DocumentClass};
use crate::services::container::{pack, PackMode};
use crate::services::transformation::TransformationEngine;

/// Terminal result of `sign_with_key_and_respond`, also reported to the responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Signed,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobState {
    Created,
    Previewing,
    Signing,
    Signed,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Created => "created",
            JobState::Previewing => "previewing",
            JobState::Signing => "signing",
            JobState::Signed => "signed",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct SigningJob<R: Responder> {
    document: Document,
    parameters: SigningParameters,
    responder: R,
    transformer: TransformationEngine,
    preview_encoding: String,
}

impl<R: Responder> SigningJob<R> {
    #[must_use]
    pub fn new(document: Document, parameters: SigningParameters, responder: R) -> Self {
        let job = Self {
            document,
            parameters,
            responder,
            transformer: TransformationEngine::default(),
            preview_encoding: crate::domain::constants::DOCUMENT_TEXT_ENCODING.to_string(),
        };
        job.log_state(JobState::Created);
        job
    }

    /// Use `transformer` for previews instead of the default processor.
    #[must_use]
    pub fn with_transformation_engine(mut self, transformer: TransformationEngine) -> Self {
        self.transformer = transformer;
        self
    }

    #[must_use]
    pub fn with_preview_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.preview_encoding = encoding.into();
        self
    }

    /// Job for a file on disk: PDFs are signed as PAdES, everything else as
    /// XAdES in the configured ASiC container.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and
    /// `ConfigurationError` for invalid configuration values.
    pub fn build_from_file<P: AsRef<Path>>(
        path: P,
        config: &SignerConfiguration,
        responder: R,
    ) -> SigningResult<Self> {
        let (document, parameters) = file_job_inputs(path.as_ref(), config)?;
        Ok(Self::new(document, parameters, responder)
            .with_preview_encoding(config.preview_encoding.clone()))
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn parameters(&self) -> &SigningParameters {
        &self.parameters
    }

    #[must_use]
    pub fn responder(&self) -> &R {
        &self.responder
    }

    /// Explicit preview output type wins; otherwise the document's own type decides.
    #[must_use]
    pub fn is_plain_text(&self) -> bool {
        match &self.parameters.transformation_output_mime_type {
            Some(output) => *output == MimeType::Text,
            None => *self.document.mime_type() == MimeType::Text,
        }
    }

    #[must_use]
    pub fn is_html(&self) -> bool {
        self.parameters.transformation_output_mime_type == Some(MimeType::Html)
    }

    #[must_use]
    pub fn is_pdf(&self) -> bool {
        *self.document.mime_type() == MimeType::Pdf
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.document.mime_type().is_image()
    }

    #[must_use]
    pub fn visualization_width(&self) -> u32 {
        self.parameters.visualization_width
    }

    #[must_use]
    pub fn should_check_pdf_compliance(&self) -> bool {
        self.parameters.check_pdfa_compliance()
    }

    /// Plain-text preview. Text documents are returned as decoded, XML goes
    /// through the transformation.
    ///
    /// # Errors
    ///
    /// Returns `TransformationError` if no preview can be rendered.
    pub fn document_as_plain_text(&self) -> SigningResult<String> {
        self.render_preview()
    }

    /// HTML preview rendered through the transformation.
    ///
    /// # Errors
    ///
    /// Returns `TransformationError` if no preview can be rendered.
    pub fn document_as_html(&self) -> SigningResult<String> {
        self.render_preview()
    }

    #[must_use]
    pub fn document_as_base64(&self) -> String {
        self.document.as_base64()
    }

    fn render_preview(&self) -> SigningResult<String> {
        self.log_state(JobState::Previewing);
        if classify(&self.document) == DocumentClass::Opaque {
            log::warn!(
                "Preview requested for opaque {} document",
                self.document.mime_type()
            );
        }
        self.transformer.render_preview(
            &self.document,
            self.parameters.transformation.as_deref(),
            &self.preview_encoding,
        )
    }

    /// Sign the document and hand the result to the responder.
    ///
    /// Consumes the job. Exactly one of `on_signed` / `on_failed` is called.
    pub fn sign_with_key_and_respond(
        self,
        engines: &SignatureEngines,
        key: &dyn SigningKey,
        cancel: &CancellationToken,
    ) -> JobOutcome {
        self.log_state(JobState::Signing);

        match self.sign(engines, key, cancel) {
            Ok(signed) => {
                self.log_state(JobState::Signed);
                log::info!(
                    "Signed {} document ({} bytes)",
                    signed.document().mime_type(),
                    signed.document().len()
                );
                self.responder.on_signed(signed);
                JobOutcome::Signed
            }
            Err(error) => {
                self.log_state(JobState::Failed);
                log::error!("Signing failed: {error}");
                let failure = Failure::from(error);
                let kind = failure.kind();
                self.responder.on_failed(failure);
                JobOutcome::Failed(kind)
            }
        }
    }

    fn sign(
        &self,
        engines: &SignatureEngines,
        key: &dyn SigningKey,
        cancel: &CancellationToken,
    ) -> SigningResult<SignedDocument> {
        check_cancelled(cancel)?;

        let document = self.document_for_signing()?;
        let profile = BoundProfile {
            profile: self.parameters.profile.clone(),
            digest_algorithm: self.parameters.digest_algorithm,
            signing_certificate: key.certificate(),
            certificate_chain: key.certificate_chain(),
        };
        let engine = engines.for_family(self.parameters.family());

        let data_to_sign = engine.compute_data_to_sign(&document, &profile)?;
        log::debug!(
            "Data to sign: {} bytes, sha256 {}",
            data_to_sign.len(),
            hex_prefix(&DigestAlgorithm::Sha256.digest(&data_to_sign))
        );

        check_cancelled(cancel)?;
        let signature = key.sign(&data_to_sign, profile.digest_algorithm, cancel)?;
        check_cancelled(cancel)?;
        log::debug!("Signature value: {} bytes", signature.as_slice().len());

        let signed = engine.assemble(&document, &profile, &signature)?;
        Ok(SignedDocument::new(signed, profile.signing_certificate))
    }

    /// The exact document both engine phases see.
    fn document_for_signing(&self) -> SigningResult<Document> {
        match (&self.parameters.profile, &self.parameters.data_container) {
            (SignatureProfile::Xades(_) | SignatureProfile::Cades(_), Some(container)) => {
                pack(&self.document, container, PackMode::Idempotent)
            }
            (SignatureProfile::Xades(_) | SignatureProfile::Cades(_), None) => {
                Ok(self.document.clone())
            }
            (SignatureProfile::Pades(_), _) => Ok(self.document.clone()),
        }
    }

    fn log_state(&self, state: JobState) {
        log::info!(
            "Job {}: {} {} ({} bytes)",
            state,
            self.parameters.family(),
            self.document.mime_type(),
            self.document.len()
        );
    }
}

impl SigningJob<SaveFileResponder> {
    /// File-based job whose signed output is saved next to the source.
    ///
    /// # Errors
    ///
    /// See [`SigningJob::build_from_file`].
    pub fn build_saving_next_to_source<P: AsRef<Path>>(
        path: P,
        config: &SignerConfiguration,
    ) -> SigningResult<Self> {
        let path = path.as_ref();
        let (document, parameters) = file_job_inputs(path, config)?;
        let responder = SaveFileResponder::new(path, signed_extension(&parameters));
        Ok(Self::new(document, parameters, responder)
            .with_preview_encoding(config.preview_encoding.clone()))
    }
}

fn file_job_inputs(
    path: &Path,
    config: &SignerConfiguration,
) -> SigningResult<(Document, SigningParameters)> {
    let document = Document::from_file(path)?;
    let level = config.level()?;
    let defaults = config.resolver_defaults()?;

    let parameters = if *document.mime_type() == MimeType::Pdf {
        SigningParameters::for_pdf(level, defaults.digest_for(SignatureFamily::Pades))
    } else {
        SigningParameters::for_asic_xades(
            level,
            config.container()?,
            defaults.digest_for(SignatureFamily::Xades),
        )
    };
    Ok((document, parameters))
}

fn check_cancelled(cancel: &CancellationToken) -> SigningResult<()> {
    if cancel.is_cancelled() {
        Err(SigningError::SigningCancelled(
            "Signing was cancelled".to_string(),
        ))
    } else {
        Ok(())
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(8)])
}
