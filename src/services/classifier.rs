//! Document classification.
//!
//! Classification is a pure function of the declared mime type. The only
//! content inspection is for XML documents, where the root element is read
//! to recognise an XML data container declared as plain XML.

use std::fmt;

use crate::domain::constants::{XDC_NAMESPACE, XDC_ROOT_ELEMENT};
use crate::domain::document::Document;
use crate::domain::mime::MimeType;
use crate::services::xml;

/// Document family as far as previews and packing are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentClass {
    PlainText,
    Image,
    Pdf,
    Xml,
    DataContainer,
    /// Anything else; only usable as an opaque payload
    Opaque,
}

impl DocumentClass {
    /// Whether a preview can be rendered through a transformation.
    #[must_use]
    pub fn is_transformable(&self) -> bool {
        matches!(self, DocumentClass::Xml | DocumentClass::DataContainer)
    }
}

impl fmt::Display for DocumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentClass::PlainText => "plain text",
            DocumentClass::Image => "image",
            DocumentClass::Pdf => "PDF",
            DocumentClass::Xml => "XML",
            DocumentClass::DataContainer => "XML data container",
            DocumentClass::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Classify a document. Unsupported types are reported as `Opaque`, never rejected.
#[must_use]
pub fn classify(document: &Document) -> DocumentClass {
    match document.mime_type() {
        MimeType::Text => DocumentClass::PlainText,
        MimeType::Jpeg | MimeType::Png => DocumentClass::Image,
        MimeType::Pdf => DocumentClass::Pdf,
        MimeType::XmlDataContainer => DocumentClass::DataContainer,
        MimeType::Xml => {
            if has_container_root(document.content()) {
                DocumentClass::DataContainer
            } else {
                DocumentClass::Xml
            }
        }
        MimeType::Html
        | MimeType::AsicE
        | MimeType::AsicS
        | MimeType::Pkcs7
        | MimeType::Other(_) => DocumentClass::Opaque,
    }
}

/// Whether the root element is `{XDC namespace}XMLDataContainer`.
#[must_use]
pub fn has_container_root(content: &[u8]) -> bool {
    xml::root_element(content)
        .map(|root| root.is(XDC_NAMESPACE, XDC_ROOT_ELEMENT))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, mime: MimeType) -> Document {
        Document::new(content.as_bytes().to_vec(), mime)
    }

    #[test]
    fn test_classify_by_mime_type() {
        assert_eq!(classify(&doc("hi", MimeType::Text)), DocumentClass::PlainText);
        assert_eq!(classify(&doc("", MimeType::Png)), DocumentClass::Image);
        assert_eq!(classify(&doc("", MimeType::Jpeg)), DocumentClass::Image);
        assert_eq!(classify(&doc("%PDF", MimeType::Pdf)), DocumentClass::Pdf);
        assert_eq!(classify(&doc("<a/>", MimeType::Xml)), DocumentClass::Xml);
        assert_eq!(
            classify(&doc("", MimeType::Other("application/msword".into()))),
            DocumentClass::Opaque
        );
    }

    #[test]
    fn test_declared_container_type_wins() {
        assert_eq!(
            classify(&doc("<a/>", MimeType::XmlDataContainer)),
            DocumentClass::DataContainer
        );
    }

    #[test]
    fn test_container_recognised_by_namespace() {
        let xdc = format!(
            r#"<?xml version="1.0"?><x:XMLDataContainer xmlns:x="{XDC_NAMESPACE}"><x:XMLData/></x:XMLDataContainer>"#
        );
        assert_eq!(classify(&doc(&xdc, MimeType::Xml)), DocumentClass::DataContainer);

        let lookalike = r#"<XMLDataContainer xmlns="urn:not-xdc"/>"#;
        assert_eq!(classify(&doc(lookalike, MimeType::Xml)), DocumentClass::Xml);
    }

    #[test]
    fn test_malformed_xml_still_classified() {
        assert_eq!(classify(&doc("<<<", MimeType::Xml)), DocumentClass::Xml);
    }

    #[test]
    fn test_transformable() {
        assert!(DocumentClass::Xml.is_transformable());
        assert!(DocumentClass::DataContainer.is_transformable());
        assert!(!DocumentClass::PlainText.is_transformable());
        assert!(!DocumentClass::Pdf.is_transformable());
    }
}
