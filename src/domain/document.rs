//! Documents flowing through a signing job.
//!
//! A `Document` is immutable: packing and signing produce new values. The
//! content is reference-counted so that passing a document through a no-op
//! step hands back the very same payload.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use base64::Engine;

use crate::domain::crypto::Certificate;
use crate::domain::mime::MimeType;
use crate::infra::error::{SigningError, SigningResult};

/// Byte payload with its declared mime type and optional filename.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    content: Arc<[u8]>,
    mime_type: MimeType,
    filename: Option<String>,
}

impl Document {
    #[must_use]
    pub fn new(content: impl Into<Vec<u8>>, mime_type: MimeType) -> Self {
        Self {
            content: Arc::from(content.into()),
            mime_type,
            filename: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Load a document from disk, guessing the mime type from the extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SigningResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| {
            SigningError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;

        let mut document = Self::new(content, MimeType::from_filename(path));
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            document.filename = Some(name.to_string());
        }
        Ok(document)
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn mime_type(&self) -> &MimeType {
        &self.mime_type
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when both documents hold the same payload instance.
    #[must_use]
    pub fn shares_content_with(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.content, &other.content)
    }

    #[must_use]
    pub fn as_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.content)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Document(mime={}, len={}, filename={:?})",
            self.mime_type,
            self.content.len(),
            self.filename
        )
    }
}

/// Successful job output: the signed document and the certificate that signed it.
#[derive(Debug, Clone)]
pub struct SignedDocument {
    document: Document,
    certificate: Certificate,
}

impl SignedDocument {
    #[must_use]
    pub fn new(document: Document, certificate: Certificate) -> Self {
        Self {
            document,
            certificate,
        }
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    #[must_use]
    pub fn into_parts(self) -> (Document, Certificate) {
        (self.document, self.certificate)
    }
}
