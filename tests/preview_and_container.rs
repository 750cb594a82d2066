//! Preview rendering and data container packing through the public API.

mod common;

use std::sync::Arc;

use common::{
    RecordingResponder, TagStrippingProcessor, GENERAL_AGENDA, GENERAL_AGENDA_IDENTIFIER,
    PREVIEW_XSLT,
};
use document_signer::services::extract_payload;
use document_signer::{
    classify, pack, resolve, DataContainerProfile, Document, DocumentClass, MimeType, PackMode,
    RawSigningParameters, ResolverDefaults, SigningError, SigningJob, TransformationEngine,
};

fn engine() -> TransformationEngine {
    TransformationEngine::new(Arc::new(TagStrippingProcessor))
}

fn agenda() -> Document {
    Document::new(GENERAL_AGENDA.as_bytes().to_vec(), MimeType::Xml)
}

fn profile() -> DataContainerProfile {
    let mut profile = DataContainerProfile::new(GENERAL_AGENDA_IDENTIFIER);
    profile.transformation = Some(PREVIEW_XSLT.to_string());
    profile.transformation_location =
        Some("http://schemas.gov.sk/form/App.GeneralAgenda/1.9/form.xslt".to_string());
    profile.media_destination = Some("TXT".to_string());
    profile
}

mod container_tests {
    use super::*;

    #[test]
    fn test_pack_is_idempotent() {
        let once = pack(&agenda(), &profile(), PackMode::Idempotent).expect("pack");
        let twice = pack(&once, &profile(), PackMode::Idempotent).expect("pack again");

        assert_eq!(once.content(), twice.content());
        assert!(once.shares_content_with(&twice));
        assert_eq!(classify(&twice), DocumentClass::DataContainer);
    }

    #[test]
    fn test_payload_round_trips() {
        let packed = pack(&agenda(), &profile(), PackMode::Idempotent).expect("pack");
        let payload = extract_payload(&packed).expect("payload");
        let payload = String::from_utf8(payload).expect("utf8");

        let original = GENERAL_AGENDA
            .split_once("?>")
            .map(|(_, body)| body.trim())
            .expect("declaration");
        assert_eq!(payload, original);
    }

    #[test]
    fn test_force_double_wraps() {
        let once = pack(&agenda(), &profile(), PackMode::Idempotent).expect("pack");
        let forced = pack(&once, &profile(), PackMode::Force).expect("force");
        assert_ne!(once.content(), forced.content());

        // The payload of the outer envelope is the inner envelope
        let inner = Document::new(extract_payload(&forced).expect("outer payload"), MimeType::Xml);
        assert_eq!(classify(&inner), DocumentClass::DataContainer);
        assert_eq!(
            extract_payload(&inner).expect("inner payload"),
            extract_payload(&once).expect("payload")
        );
    }

    #[test]
    fn test_plain_text_cannot_be_packed() {
        let text = Document::new(b"hello".to_vec(), MimeType::Text);
        let err = pack(&text, &profile(), PackMode::Idempotent).expect_err("not XML");
        assert!(matches!(err, SigningError::ContainerError(_)));
    }
}

mod preview_tests {
    use super::*;

    #[test]
    fn test_xml_preview_is_trimmed() {
        let preview = engine()
            .render_preview(&agenda(), Some(PREVIEW_XSLT), "UTF-8")
            .expect("preview");
        assert_eq!(preview, "Návrh Prosím o vybavenie &amp; potvrdenie.");
    }

    #[test]
    fn test_container_preview_matches_payload_preview() {
        let packed = pack(&agenda(), &profile(), PackMode::Idempotent).expect("pack");
        let direct = engine()
            .render_preview(&agenda(), Some(PREVIEW_XSLT), "UTF-8")
            .expect("preview");
        let wrapped = engine()
            .render_preview(&packed, Some(PREVIEW_XSLT), "UTF-8")
            .expect("container preview");
        assert_eq!(direct, wrapped);
    }

    #[test]
    fn test_preview_never_mutates_document() {
        let document = agenda();
        let before = document.content().to_vec();
        for _ in 0..3 {
            engine()
                .render_preview(&document, Some(PREVIEW_XSLT), "UTF-8")
                .expect("preview");
        }
        assert_eq!(document.content(), before.as_slice());
    }

    #[test]
    fn test_invalid_stylesheet() {
        let err = engine()
            .render_preview(&agenda(), Some("INVALID"), "UTF-8")
            .expect_err("invalid stylesheet");
        assert!(matches!(err, SigningError::TransformationError(_)));
    }

    #[test]
    fn test_container_without_payload() {
        let xdc = r#"<XMLDataContainer xmlns="http://data.gov.sk/def/container/xmldatacontainer+xml/1.1"><XMLData/></XMLDataContainer>"#;
        let doc = Document::new(xdc.as_bytes().to_vec(), MimeType::XmlDataContainer);
        let err = engine()
            .render_preview(&doc, Some(PREVIEW_XSLT), "UTF-8")
            .expect_err("empty container");
        assert!(matches!(err, SigningError::TransformationError(_)));
    }

    #[test]
    fn test_plain_text_job_returns_raw_content() {
        let raw = RawSigningParameters {
            level: Some("CAdES_BASELINE_B".to_string()),
            ..Default::default()
        };
        let params =
            resolve(&raw, &MimeType::Text, &ResolverDefaults::default()).expect("parameters");
        let text = "  Dobrý deň,\n\tpodpisujem.  \n";
        let job = SigningJob::new(
            Document::new(text.as_bytes().to_vec(), MimeType::Text),
            params,
            Arc::new(RecordingResponder::default()),
        )
        .with_transformation_engine(engine());

        assert!(job.is_plain_text());
        assert_eq!(job.document_as_plain_text().expect("preview"), text);
    }

    #[test]
    fn test_html_job_preview() {
        let raw = RawSigningParameters {
            level: Some("XAdES_BASELINE_B".to_string()),
            transformation: Some(PREVIEW_XSLT.to_string()),
            transformation_output_mime_type: Some("text/html".to_string()),
            ..Default::default()
        };
        let params =
            resolve(&raw, &MimeType::Xml, &ResolverDefaults::default()).expect("parameters");
        let job = SigningJob::new(agenda(), params, Arc::new(RecordingResponder::default()))
            .with_transformation_engine(engine());

        assert!(job.is_html());
        assert!(!job.is_plain_text());
        assert!(job.document_as_html().expect("preview").starts_with("Návrh"));
    }
}

#[cfg(feature = "libxslt")]
mod default_processor_tests {
    use super::*;

    const SUBJECT_XSLT: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform" xmlns:ga="http://schemas.gov.sk/form/App.GeneralAgenda/1.9">
    <xsl:output method="text"/>
    <xsl:template match="/">Predmet: <xsl:value-of select="ga:GeneralAgenda/ga:subject"/></xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn test_default_build_renders_container_preview() {
        let packed = pack(&agenda(), &profile(), PackMode::Idempotent).expect("pack");

        let preview = TransformationEngine::default()
            .render_preview(&packed, Some(SUBJECT_XSLT), "UTF-8")
            .expect("preview");
        assert_eq!(preview, "Predmet: Návrh");
    }

    #[test]
    fn test_default_build_text_output_keeps_characters() {
        let preview = TransformationEngine::default()
            .render_preview(&agenda(), Some(PREVIEW_XSLT), "UTF-8")
            .expect("preview");
        assert!(!preview.starts_with("<?xml"));
        assert_eq!(preview, "NávrhProsím o vybavenie & potvrdenie.");
    }
}
