//! End-to-end signing job behaviour against fake engines, keys and responders.

mod common;

use std::sync::Arc;

use common::{
    document_digest_hex, FakeEngine, FakeKey, RecordingResponder, RejectingEngine,
    GENERAL_AGENDA, GENERAL_AGENDA_IDENTIFIER,
};
use document_signer::{
    classify, pack, resolve, DataContainerProfile, Document, DocumentClass, FailureKind,
    JobOutcome, MimeType, PackMode, RawSigningParameters, ResolverDefaults, SignatureEngines,
    SigningJob,
};
use tokio_util::sync::CancellationToken;

const XDC_NAMESPACE: &str = "http://data.gov.sk/def/container/xmldatacontainer+xml/1.1";

fn xdc_request() -> RawSigningParameters {
    RawSigningParameters {
        level: Some("XAdES_BASELINE_B".to_string()),
        container: Some("ASiC_E".to_string()),
        container_xmlns: Some(XDC_NAMESPACE.to_string()),
        identifier: Some(GENERAL_AGENDA_IDENTIFIER.to_string()),
        ..Default::default()
    }
}

fn agenda() -> Document {
    Document::new(GENERAL_AGENDA.as_bytes().to_vec(), MimeType::Xml).with_filename("agenda.xml")
}

mod signing_tests {
    use super::*;

    #[test]
    fn test_packed_bytes_are_signed() {
        let params = resolve(&xdc_request(), &MimeType::Xml, &ResolverDefaults::default())
            .expect("valid parameters");
        let profile = params.data_container.clone().expect("data container requested");
        let expected = pack(&agenda(), &profile, PackMode::Idempotent).expect("pack");

        let engine = Arc::new(FakeEngine::default());
        let responder = Arc::new(RecordingResponder::default());
        let job = SigningJob::new(agenda(), params, Arc::clone(&responder));

        let outcome = job.sign_with_key_and_respond(
            &SignatureEngines::uniform(engine.clone()),
            &FakeKey::default(),
            &CancellationToken::new(),
        );
        assert_eq!(outcome, JobOutcome::Signed);

        // Both phases saw the same packed document
        let seen = engine.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0].mime_type(), &MimeType::XmlDataContainer);
        assert_eq!(seen[0].content(), expected.content());

        let signed = responder.signed();
        assert_eq!(signed.len(), 1);
        assert!(responder.failed().is_empty());
        let output = String::from_utf8(signed[0].document().content().to_vec()).expect("utf8");
        assert!(output.contains(&document_digest_hex(expected.content())));
        assert!(!output.contains(&document_digest_hex(GENERAL_AGENDA.as_bytes())));
        assert_eq!(signed[0].document().mime_type(), &MimeType::AsicE);
        assert_eq!(signed[0].certificate(), &common::test_certificate());
    }

    #[test]
    fn test_existing_container_is_signed_as_is() {
        let profile = DataContainerProfile::new(GENERAL_AGENDA_IDENTIFIER);
        let container = pack(&agenda(), &profile, PackMode::Idempotent).expect("pack");
        let params = resolve(
            &xdc_request(),
            &MimeType::XmlDataContainer,
            &ResolverDefaults::default(),
        )
        .expect("valid parameters");

        let engine = Arc::new(FakeEngine::default());
        let responder = Arc::new(RecordingResponder::default());
        SigningJob::new(container.clone(), params, Arc::clone(&responder))
            .sign_with_key_and_respond(
                &SignatureEngines::uniform(engine.clone()),
                &FakeKey::default(),
                &CancellationToken::new(),
            );

        let seen = engine.seen();
        assert!(seen[0].shares_content_with(&container));
        assert_eq!(classify(&seen[0]), DocumentClass::DataContainer);
    }

    #[test]
    fn test_plain_xades_without_container_keeps_document() {
        let raw = RawSigningParameters {
            level: Some("XAdES_BASELINE_B".to_string()),
            ..Default::default()
        };
        let params =
            resolve(&raw, &MimeType::Xml, &ResolverDefaults::default()).expect("valid parameters");

        let engine = Arc::new(FakeEngine::default());
        let responder = Arc::new(RecordingResponder::default());
        let original = agenda();
        SigningJob::new(original.clone(), params, Arc::clone(&responder))
            .sign_with_key_and_respond(
                &SignatureEngines::uniform(engine.clone()),
                &FakeKey::default(),
                &CancellationToken::new(),
            );

        assert!(engine.seen()[0].shares_content_with(&original));
        assert_eq!(responder.signed()[0].document().mime_type(), &MimeType::Xml);
    }

    #[test]
    fn test_pades_never_packs() {
        let raw = RawSigningParameters {
            level: Some("PAdES_BASELINE_B".to_string()),
            ..Default::default()
        };
        let pdf = Document::new(b"%PDF-1.7\n%%EOF".to_vec(), MimeType::Pdf);
        let params =
            resolve(&raw, &MimeType::Pdf, &ResolverDefaults::default()).expect("valid parameters");

        let engine = Arc::new(FakeEngine::default());
        let responder = Arc::new(RecordingResponder::default());
        SigningJob::new(pdf.clone(), params, Arc::clone(&responder)).sign_with_key_and_respond(
            &SignatureEngines::uniform(engine.clone()),
            &FakeKey::default(),
            &CancellationToken::new(),
        );

        assert!(engine.seen()[0].shares_content_with(&pdf));
        assert_eq!(responder.signed()[0].document().mime_type(), &MimeType::Pdf);
    }
}

mod failure_tests {
    use super::*;

    fn run(engines: SignatureEngines, key: FakeKey, document: Document) -> Arc<RecordingResponder> {
        let params = resolve(&xdc_request(), document.mime_type(), &ResolverDefaults::default())
            .expect("valid parameters");
        let responder = Arc::new(RecordingResponder::default());
        SigningJob::new(document, params, Arc::clone(&responder)).sign_with_key_and_respond(
            &engines,
            &key,
            &CancellationToken::new(),
        );
        responder
    }

    #[test]
    fn test_adapter_failure_notifies_once() {
        let responder = run(
            SignatureEngines::uniform(Arc::new(RejectingEngine)),
            FakeKey::default(),
            agenda(),
        );
        assert!(responder.signed().is_empty());
        let failed = responder.failed();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].kind(), FailureKind::Adapter);
        assert!(failed[0].message().contains("profile rejected"));
    }

    #[test]
    fn test_key_failure_notifies_once() {
        let responder = run(
            SignatureEngines::uniform(Arc::new(FakeEngine::default())),
            FakeKey { failing: true },
            agenda(),
        );
        assert!(responder.signed().is_empty());
        assert_eq!(responder.failed().len(), 1);
        assert_eq!(responder.failed()[0].kind(), FailureKind::Key);
        assert!(!responder.failed()[0].kind().is_user_fault());
    }

    #[test]
    fn test_malformed_payload_fails_before_engine() {
        let engine = Arc::new(FakeEngine::default());
        let broken = Document::new(b"<GeneralAgenda><subject>".to_vec(), MimeType::Xml);
        let responder = run(
            SignatureEngines::uniform(engine.clone()),
            FakeKey::default(),
            broken,
        );

        assert!(engine.seen().is_empty());
        assert_eq!(responder.failed().len(), 1);
        assert_eq!(responder.failed()[0].kind(), FailureKind::Container);
    }

    #[test]
    fn test_retry_uses_a_fresh_job() {
        let engines = SignatureEngines::uniform(Arc::new(FakeEngine::default()));
        let first = run(engines.clone(), FakeKey { failing: true }, agenda());
        let second = run(engines, FakeKey::default(), agenda());

        assert_eq!(first.failed().len(), 1);
        assert_eq!(second.signed().len(), 1);
        assert!(second.failed().is_empty());
    }
}
