//! Result sinks.
//!
//! A job calls exactly one of `on_signed` / `on_failed`, exactly once.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::domain::document::SignedDocument;
use crate::domain::failure::Failure;
use crate::domain::parameters::{AsicContainer, SignatureProfile, SigningParameters};
use crate::infra::error::{SigningError, SigningResult};

#[cfg_attr(test, mockall::automock)]
pub trait Responder: Send + Sync {
    fn on_signed(&self, signed: SignedDocument);
    fn on_failed(&self, failure: Failure);
}

impl<R: Responder + ?Sized> Responder for Arc<R> {
    fn on_signed(&self, signed: SignedDocument) {
        (**self).on_signed(signed);
    }

    fn on_failed(&self, failure: Failure) {
        (**self).on_failed(failure);
    }
}

/// File extension of the signed output for `parameters`.
#[must_use]
pub fn signed_extension(parameters: &SigningParameters) -> &'static str {
    match (&parameters.profile, parameters.container()) {
        (SignatureProfile::Pades(_), _) => "pdf",
        (_, Some(AsicContainer::AsicE)) => "asice",
        (_, Some(AsicContainer::AsicS)) => "asics",
        (SignatureProfile::Xades(_), None) => "xml",
        (SignatureProfile::Cades(_), None) => "p7m",
    }
}

/// Writes the signed document next to its source file.
///
/// `report.xml` becomes `report_signed.asice`; an existing file is never
/// overwritten, `_1`, `_2` and so on are appended instead.
///
/// The job reports `Signed` as soon as the engine is done, so a failed write
/// does not change its outcome. Clones share the save result: keep a clone
/// and check [`SaveFileResponder::last_saved`] after signing.
#[derive(Debug, Clone)]
pub struct SaveFileResponder {
    source: PathBuf,
    extension: String,
    saved: Arc<Mutex<Option<SigningResult<PathBuf>>>>,
}

impl SaveFileResponder {
    #[must_use]
    pub fn new<P: AsRef<Path>>(source: P, extension: impl Into<String>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            extension: extension.into(),
            saved: Arc::new(Mutex::new(None)),
        }
    }

    /// First free `<stem>_signed[_n].<ext>` path next to the source.
    #[must_use]
    pub fn target_path(&self) -> PathBuf {
        let directory = self.source.parent().unwrap_or_else(|| Path::new(""));
        let stem = self
            .source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let mut candidate = directory.join(format!("{stem}_signed.{}", self.extension));
        let mut counter = 1;
        while candidate.exists() {
            candidate = directory.join(format!("{stem}_signed_{counter}.{}", self.extension));
            counter += 1;
        }
        candidate
    }

    /// Write `signed` to the next free target path.
    ///
    /// # Errors
    ///
    /// Returns `IoError` naming the target if the file cannot be written.
    pub fn save(&self, signed: &SignedDocument) -> SigningResult<PathBuf> {
        let target = self.target_path();
        std::fs::write(&target, signed.document().content()).map_err(|e| {
            SigningError::IoError(format!("Failed to save {}: {e}", target.display()))
        })?;
        Ok(target)
    }

    /// Result of the most recent `on_signed`, `None` before any.
    #[must_use]
    pub fn last_saved(&self) -> Option<SigningResult<PathBuf>> {
        self.saved.lock().ok().and_then(|slot| slot.clone())
    }
}

impl Responder for SaveFileResponder {
    fn on_signed(&self, signed: SignedDocument) {
        let result = self.save(&signed);
        match &result {
            Ok(target) => log::info!(
                "Signed document saved to {} ({} bytes)",
                target.display(),
                signed.document().len()
            ),
            Err(e) => log::error!(
                "Signing {} succeeded but the output was not saved: {e}",
                self.source.display()
            ),
        }
        if let Ok(mut slot) = self.saved.lock() {
            *slot = Some(result);
        }
    }

    fn on_failed(&self, failure: Failure) {
        log::error!(
            "Signing {} failed: {}",
            self.source.display(),
            failure.message()
        );
        if let Some(cause) = failure.cause() {
            log::error!("Caused by: {cause}");
        }
    }
}
