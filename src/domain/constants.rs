//! Wire-level identifiers of the XML data container (XDC) format.
//!
//! These values are fixed by the published XDC 1.1 schema and must be used
//! verbatim for interoperability.

/// Namespace of the XDC envelope and its payload element.
pub const XDC_NAMESPACE: &str = "http://data.gov.sk/def/container/xmldatacontainer+xml/1.1";

/// Mime type of an XDC document.
pub const XDC_MIME_TYPE: &str = "application/vnd.gov.sk.xmldatacontainer+xml";

/// Root element of the envelope.
pub const XDC_ROOT_ELEMENT: &str = "XMLDataContainer";

/// Element holding the wrapped payload.
pub const XDC_PAYLOAD_ELEMENT: &str = "XMLData";

/// Prefix used when writing a new envelope.
pub const XDC_PREFIX: &str = "xdc";

/// `DigestMethod` written for referenced schemas (SHA-256).
pub const XDC_DIGEST_METHOD: &str = "urn:oid:2.16.840.1.101.3.4.2.1";

/// `ContentType` attribute of the payload element.
pub const XDC_PAYLOAD_CONTENT_TYPE: &str = "application/xml; charset=UTF-8";

/// `ContentType` of the referenced presentation stylesheet.
pub const XSLT_CONTENT_TYPE: &str = "application/xslt+xml";

/// Encoding used for plain-text documents and stylesheet text.
pub const DOCUMENT_TEXT_ENCODING: &str = "UTF-8";
