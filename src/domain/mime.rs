//! Mime types understood by the signer.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::domain::constants::XDC_MIME_TYPE;
use crate::infra::error::SigningError;

/// Declared mime type of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MimeType {
    Text,
    Html,
    Pdf,
    Xml,
    Jpeg,
    Png,
    /// XML data container (XDC) envelope
    XmlDataContainer,
    AsicE,
    AsicS,
    Pkcs7,
    /// Anything else, stored lowercased without parameters
    Other(String),
}

impl MimeType {
    /// Parse a mime type string, dropping parameters such as `;base64`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/plain" => Self::Text,
            "text/html" | "application/xhtml+xml" => Self::Html,
            "application/pdf" => Self::Pdf,
            "application/xml" | "text/xml" => Self::Xml,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/png" => Self::Png,
            XDC_MIME_TYPE => Self::XmlDataContainer,
            "application/vnd.etsi.asic-e+zip" => Self::AsicE,
            "application/vnd.etsi.asic-s+zip" => Self::AsicS,
            "application/pkcs7-signature" | "application/pkcs7-mime" => Self::Pkcs7,
            _ => Self::Other(essence),
        }
    }

    /// Guess the mime type from a file extension.
    #[must_use]
    pub fn from_filename(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" => Self::Text,
            "html" | "htm" => Self::Html,
            "pdf" => Self::Pdf,
            "xml" => Self::Xml,
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "xdcf" => Self::XmlDataContainer,
            "asice" | "sce" => Self::AsicE,
            "asics" | "scs" => Self::AsicS,
            "p7m" | "p7s" => Self::Pkcs7,
            _ => Self::Other("application/octet-stream".to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text/plain",
            Self::Html => "text/html",
            Self::Pdf => "application/pdf",
            Self::Xml => "application/xml",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::XmlDataContainer => XDC_MIME_TYPE,
            Self::AsicE => "application/vnd.etsi.asic-e+zip",
            Self::AsicS => "application/vnd.etsi.asic-s+zip",
            Self::Pkcs7 => "application/pkcs7-signature",
            Self::Other(s) => s,
        }
    }

    /// Typical file extension, without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        match self {
            Self::Text => "txt",
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Xml | Self::XmlDataContainer => "xml",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::AsicE => "asice",
            Self::AsicS => "asics",
            Self::Pkcs7 => "p7m",
            Self::Other(_) => "bin",
        }
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }

    /// Whether the payload is XML (plain or already wrapped).
    #[must_use]
    pub fn is_xml(&self) -> bool {
        matches!(self, Self::Xml | Self::XmlDataContainer)
    }
}

impl FromStr for MimeType {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SigningError::ValidationError(
                "Mime type must not be empty".to_string(),
            ));
        }
        Ok(Self::parse(s))
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_parameters() {
        assert_eq!(MimeType::parse("application/xml;base64"), MimeType::Xml);
        assert_eq!(MimeType::parse("Text/Plain; charset=UTF-8"), MimeType::Text);
        assert_eq!(
            MimeType::parse("application/vnd.gov.sk.xmldatacontainer+xml;base64"),
            MimeType::XmlDataContainer
        );
    }

    #[test]
    fn test_unknown_type_is_kept() {
        let mime = MimeType::parse("application/msword");
        assert_eq!(mime, MimeType::Other("application/msword".to_string()));
        assert_eq!(mime.as_str(), "application/msword");
    }

    #[test]
    fn test_empty_rejected() {
        assert!("  ".parse::<MimeType>().is_err());
    }

    #[test]
    fn test_extension_detection() {
        assert_eq!(MimeType::from_filename(Path::new("a.PDF")), MimeType::Pdf);
        assert_eq!(MimeType::from_filename(Path::new("form.xml")), MimeType::Xml);
        assert_eq!(MimeType::from_filename(Path::new("scan.jpeg")), MimeType::Jpeg);
        assert!(matches!(
            MimeType::from_filename(Path::new("noext")),
            MimeType::Other(_)
        ));
    }

    #[test]
    fn test_round_trip_display() {
        for mime in [MimeType::Pdf, MimeType::XmlDataContainer, MimeType::AsicE] {
            assert_eq!(MimeType::parse(&mime.to_string()), mime);
        }
    }
}
