//! XML data container (XDC) packing.
//!
//! Wraps an XML payload into the XDC 1.1 envelope:
//!
//! ```text
//! <xdc:XMLDataContainer xmlns:xdc="…/xmldatacontainer+xml/1.1">
//!   <xdc:XMLData ContentType=… Identifier=… Version=…>payload</xdc:XMLData>
//!   <xdc:UsedSchemasReferenced>
//!     <xdc:UsedXSDReference …>schema location</xdc:UsedXSDReference>
//!     <xdc:UsedPresentationSchemaReference …>stylesheet location</xdc:UsedPresentationSchemaReference>
//!   </xdc:UsedSchemasReferenced>
//! </xdc:XMLDataContainer>
//! ```
//!
//! The envelope carries no whitespace inside `XMLData`, so the payload can be
//! imported back out byte for byte. Packing must happen before the
//! data-to-sign is computed: re-packing signed content changes the signed bytes.

use base64::Engine;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::domain::constants::{
    XDC_DIGEST_METHOD, XDC_NAMESPACE, XDC_PAYLOAD_CONTENT_TYPE, XDC_PREFIX, XSLT_CONTENT_TYPE,
};
use crate::domain::crypto::DigestAlgorithm;
use crate::domain::document::Document;
use crate::domain::mime::MimeType;
use crate::domain::parameters::DataContainerProfile;
use crate::infra::error::{SigningError, SigningResult};
use crate::services::classifier::{classify, DocumentClass};
use crate::services::xml;

/// Whether an existing container is wrapped again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackMode {
    /// Return containers unchanged, wrap everything else
    Idempotent,
    /// Always wrap; only for re-validation workflows
    Force,
}

/// Wrap `document` into an XML data container.
///
/// # Errors
///
/// Returns `ContainerError` if the payload is not XML or not well-formed.
pub fn pack(
    document: &Document,
    profile: &DataContainerProfile,
    mode: PackMode,
) -> SigningResult<Document> {
    let class = classify(document);
    if mode == PackMode::Idempotent && class == DocumentClass::DataContainer {
        log::debug!("Document is already a data container, packing skipped");
        return Ok(document.clone());
    }

    if !class.is_transformable() {
        return Err(SigningError::ContainerError(format!(
            "Only XML can be packed into a data container, got {}",
            document.mime_type()
        )));
    }

    xml::check_well_formed(document.content())
        .map_err(|e| SigningError::ContainerError(format!("Malformed payload: {e}")))?;

    let payload = xml::root_element_bytes(document.content())
        .map_err(|e| SigningError::ContainerError(format!("Malformed payload: {e}")))?;
    let envelope = write_envelope(payload, profile)
        .map_err(|e| SigningError::ContainerError(format!("Failed to write envelope: {e}")))?;
    // The prolog is gone, so the finished envelope is checked on its own.
    xml::check_well_formed(&envelope)
        .map_err(|e| SigningError::ContainerError(format!("Packed envelope is malformed: {e}")))?;

    log::info!(
        "Packed {} byte payload into data container ({} bytes, identifier {})",
        payload.len(),
        envelope.len(),
        profile.identifier
    );

    let mut packed = Document::new(envelope, MimeType::XmlDataContainer);
    if let Some(name) = document.filename() {
        packed = packed.with_filename(name);
    }
    Ok(packed)
}

fn element(local: &str) -> String {
    format!("{XDC_PREFIX}:{local}")
}

fn digest_value(text: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(DigestAlgorithm::Sha256.digest(text.as_bytes()))
}

fn write_envelope(payload: &[u8], profile: &DataContainerProfile) -> quick_xml::Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root = element("XMLDataContainer");
    let ns_attr = format!("xmlns:{XDC_PREFIX}");
    writer.write_event(Event::Start(
        BytesStart::new(root.as_str()).with_attributes([(ns_attr.as_str(), XDC_NAMESPACE)]),
    ))?;

    let data = element("XMLData");
    writer.write_event(Event::Start(BytesStart::new(data.as_str()).with_attributes([
        ("ContentType", XDC_PAYLOAD_CONTENT_TYPE),
        ("Identifier", profile.identifier.as_str()),
        ("Version", profile.effective_version()),
    ])))?;
    writer.get_mut().extend_from_slice(payload);
    writer.write_event(Event::End(BytesEnd::new(data.as_str())))?;

    let xsd_reference = profile.schema.as_deref().map(|schema| {
        (
            schema,
            profile.schema_location.as_deref().unwrap_or_default(),
        )
    });
    let xslt_reference = profile.transformation.as_deref().map(|xslt| {
        (
            xslt,
            profile.transformation_location.as_deref().unwrap_or_default(),
        )
    });

    if xsd_reference.is_some() || xslt_reference.is_some() {
        let references = element("UsedSchemasReferenced");
        writer.write_event(Event::Start(BytesStart::new(references.as_str())))?;

        if let Some((schema, location)) = xsd_reference {
            let name = element("UsedXSDReference");
            let digest = digest_value(schema);
            writer.write_event(Event::Start(BytesStart::new(name.as_str()).with_attributes([
                ("DigestMethod", XDC_DIGEST_METHOD),
                ("DigestValue", digest.as_str()),
            ])))?;
            writer.write_event(Event::Text(BytesText::new(location)))?;
            writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        }

        if let Some((xslt, location)) = xslt_reference {
            let name = element("UsedPresentationSchemaReference");
            let digest = digest_value(xslt);
            let mut start = BytesStart::new(name.as_str()).with_attributes([
                ("ContentType", XSLT_CONTENT_TYPE),
                ("DigestMethod", XDC_DIGEST_METHOD),
                ("DigestValue", digest.as_str()),
            ]);
            if let Some(language) = profile.transformation_language.as_deref() {
                start.push_attribute(("Language", language));
            }
            if let Some(destination) = profile.media_destination.as_deref() {
                start.push_attribute(("MediaDestinationTypeDescription", destination));
            }
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(location)))?;
            writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
        }

        writer.write_event(Event::End(BytesEnd::new(references.as_str())))?;
    }

    writer.write_event(Event::End(BytesEnd::new(root.as_str())))?;
    Ok(writer.into_inner())
}
