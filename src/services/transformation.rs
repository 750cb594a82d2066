//! Preview rendering.
//!
//! Turns a document into human-readable text or HTML before it is signed:
//! - plain text is decoded and returned as is, no stylesheet involved
//! - XML is checked for well-formedness and run through the stylesheet
//! - an XML data container first has its payload imported out of the
//!   envelope so the stylesheet sees the form, not the container
//!
//! Rendering never mutates the document and holds no state, so it can be
//! called repeatedly and from several threads for the same job.

use std::sync::Arc;

use crate::domain::constants::{XDC_NAMESPACE, XDC_PAYLOAD_ELEMENT};
use crate::domain::document::Document;
use crate::infra::error::{SigningError, SigningResult};
use crate::services::classifier::{classify, DocumentClass};
use crate::services::stylesheet::{default_processor, StylesheetProcessor};
use crate::services::xml;

/// Renders previews through a stylesheet processor.
#[derive(Clone)]
pub struct TransformationEngine {
    processor: Arc<dyn StylesheetProcessor>,
}

impl Default for TransformationEngine {
    fn default() -> Self {
        Self::new(default_processor())
    }
}

impl TransformationEngine {
    #[must_use]
    pub fn new(processor: Arc<dyn StylesheetProcessor>) -> Self {
        Self { processor }
    }

    /// Render a preview of `document`.
    ///
    /// # Errors
    ///
    /// Returns `TransformationError` when the output encoding is not
    /// supported, the document class has no text preview, the XML is not
    /// well-formed, a data container has no payload, no stylesheet was
    /// supplied for XML, or the stylesheet fails.
    pub fn render_preview(
        &self,
        document: &Document,
        transformation: Option<&str>,
        output_encoding: &str,
    ) -> SigningResult<String> {
        check_encoding(output_encoding)?;

        let class = classify(document);
        match class {
            DocumentClass::PlainText => {
                log::debug!("Plain text preview, {} bytes", document.len());
                Ok(String::from_utf8_lossy(document.content()).into_owned())
            }
            DocumentClass::Xml | DocumentClass::DataContainer => {
                let stylesheet = transformation.ok_or_else(|| {
                    SigningError::TransformationError(
                        "No transformation supplied for XML document".to_string(),
                    )
                })?;
                self.transform_xml(document, class, stylesheet)
            }
            DocumentClass::Image | DocumentClass::Pdf | DocumentClass::Opaque => {
                Err(SigningError::TransformationError(format!(
                    "No text preview available for {class} document ({})",
                    document.mime_type()
                )))
            }
        }
    }

    fn transform_xml(
        &self,
        document: &Document,
        class: DocumentClass,
        stylesheet: &str,
    ) -> SigningResult<String> {
        xml::check_well_formed(document.content()).map_err(SigningError::TransformationError)?;

        let output = if class == DocumentClass::DataContainer {
            let payload = extract_payload(document)?;
            log::debug!(
                "Extracted {} byte payload from data container",
                payload.len()
            );
            self.processor.transform(&payload, stylesheet)?
        } else {
            self.processor.transform(document.content(), stylesheet)?
        };

        Ok(output.trim().to_string())
    }
}

/// Import the payload element of an XML data container as a standalone document.
///
/// # Errors
///
/// Returns `TransformationError` if the container has no `XMLData` element
/// or that element holds no payload element.
pub fn extract_payload(document: &Document) -> SigningResult<Vec<u8>> {
    xml::import_first_child(document.content(), XDC_NAMESPACE, XDC_PAYLOAD_ELEMENT).map_err(
        |e| SigningError::TransformationError(format!("Malformed data container: {e}")),
    )
}

fn check_encoding(encoding: &str) -> SigningResult<()> {
    match encoding.trim().to_ascii_uppercase().as_str() {
        "UTF-8" | "UTF8" => Ok(()),
        other => Err(SigningError::TransformationError(format!(
            "Unsupported preview encoding: {other}"
        ))),
    }
}
