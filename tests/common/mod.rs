//! Hand-written fakes shared by the integration tests.
//!
//! Each integration test crate pulls in what it needs through `mod common;`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use document_signer::{
    BoundProfile, Certificate, CertificateChain, DigestAlgorithm, Document, Failure, MimeType,
    Responder, SignatureEngine, SignatureProfile, SignatureValue, SignedDocument, SigningError,
    SigningKey, SigningResult, StylesheetProcessor,
};
use tokio_util::sync::CancellationToken;

/// Engine whose output embeds the SHA-256 of the exact document it received.
///
/// Data-to-sign is the document digest; the assembled document is
/// `SIGNED:<hex document digest>:<hex signature>`.
#[derive(Default)]
pub struct FakeEngine {
    pub seen: Mutex<Vec<Document>>,
}

impl FakeEngine {
    pub fn seen(&self) -> Vec<Document> {
        self.seen.lock().expect("lock").clone()
    }
}

pub fn document_digest_hex(content: &[u8]) -> String {
    hex::encode(DigestAlgorithm::Sha256.digest(content))
}

impl SignatureEngine for FakeEngine {
    fn compute_data_to_sign(
        &self,
        document: &Document,
        _profile: &BoundProfile,
    ) -> SigningResult<Vec<u8>> {
        self.seen.lock().expect("lock").push(document.clone());
        Ok(DigestAlgorithm::Sha256.digest(document.content()))
    }

    fn assemble(
        &self,
        document: &Document,
        profile: &BoundProfile,
        signature: &SignatureValue,
    ) -> SigningResult<Document> {
        self.seen.lock().expect("lock").push(document.clone());
        let mime = match (&profile.profile, profile.profile.container()) {
            (_, Some(container)) => container.mime_type(),
            (SignatureProfile::Pades(_), None) => MimeType::Pdf,
            (SignatureProfile::Xades(_), None) => document.mime_type().clone(),
            (SignatureProfile::Cades(_), None) => MimeType::Pkcs7,
        };
        let content = format!(
            "SIGNED:{}:{}",
            document_digest_hex(document.content()),
            hex::encode(signature.as_slice())
        );
        Ok(Document::new(content.into_bytes(), mime))
    }
}

/// Engine that rejects every document.
pub struct RejectingEngine;

impl SignatureEngine for RejectingEngine {
    fn compute_data_to_sign(&self, _: &Document, _: &BoundProfile) -> SigningResult<Vec<u8>> {
        Err(SigningError::AdapterError("profile rejected".to_string()))
    }

    fn assemble(
        &self,
        _: &Document,
        _: &BoundProfile,
        _: &SignatureValue,
    ) -> SigningResult<Document> {
        Err(SigningError::AdapterError("profile rejected".to_string()))
    }
}

pub fn test_certificate() -> Certificate {
    Certificate::from_der(vec![0x30, 0x03, 0x02, 0x01, 0x01])
}

/// Key that "signs" by hashing the data with the requested digest.
#[derive(Default)]
pub struct FakeKey {
    pub failing: bool,
}

impl SigningKey for FakeKey {
    fn certificate(&self) -> Certificate {
        test_certificate()
    }

    fn certificate_chain(&self) -> CertificateChain {
        CertificateChain::new(vec![test_certificate()])
    }

    fn sign(
        &self,
        data: &[u8],
        digest: DigestAlgorithm,
        _cancel: &CancellationToken,
    ) -> SigningResult<SignatureValue> {
        if self.failing {
            return Err(SigningError::KeyError("token removed".to_string()));
        }
        Ok(SignatureValue::new(digest, digest.digest(data)))
    }
}

/// Key that waits, like a PIN prompt, until cancelled.
#[derive(Default)]
pub struct WaitingKey {
    pub cancel_called: AtomicBool,
}

impl SigningKey for WaitingKey {
    fn certificate(&self) -> Certificate {
        test_certificate()
    }

    fn certificate_chain(&self) -> CertificateChain {
        CertificateChain::default()
    }

    fn sign(
        &self,
        _data: &[u8],
        _digest: DigestAlgorithm,
        cancel: &CancellationToken,
    ) -> SigningResult<SignatureValue> {
        while !cancel.is_cancelled() {
            std::thread::sleep(Duration::from_millis(5));
        }
        Err(SigningError::SigningCancelled("PIN entry aborted".to_string()))
    }

    fn cancel(&self) {
        self.cancel_called.store(true, Ordering::SeqCst);
    }
}

/// Responder that keeps every notification.
#[derive(Default)]
pub struct RecordingResponder {
    signed: Mutex<Vec<SignedDocument>>,
    failed: Mutex<Vec<Failure>>,
}

impl RecordingResponder {
    pub fn signed(&self) -> Vec<SignedDocument> {
        self.signed.lock().expect("lock").clone()
    }

    pub fn failed(&self) -> Vec<Failure> {
        self.failed.lock().expect("lock").clone()
    }
}

impl Responder for RecordingResponder {
    fn on_signed(&self, signed: SignedDocument) {
        self.signed.lock().expect("lock").push(signed);
    }

    fn on_failed(&self, failure: Failure) {
        self.failed.lock().expect("lock").push(failure);
    }
}

/// Stylesheet processor that drops markup and keeps the text, whitespace-collapsed.
///
/// A stylesheet containing `INVALID` is rejected.
pub struct TagStrippingProcessor;

impl StylesheetProcessor for TagStrippingProcessor {
    fn transform(&self, source: &[u8], stylesheet: &str) -> SigningResult<String> {
        if stylesheet.contains("INVALID") {
            return Err(SigningError::TransformationError(
                "Invalid stylesheet".to_string(),
            ));
        }

        let text = String::from_utf8_lossy(source);
        let mut out = String::new();
        let mut in_tag = false;
        for c in text.chars() {
            match c {
                '<' => {
                    in_tag = true;
                    out.push(' ');
                }
                '>' => in_tag = false,
                _ if !in_tag => out.push(c),
                _ => {}
            }
        }
        Ok(format!(
            "\n  {}\n",
            out.split_whitespace().collect::<Vec<_>>().join(" ")
        ))
    }
}

pub const GENERAL_AGENDA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<GeneralAgenda xmlns="http://schemas.gov.sk/form/App.GeneralAgenda/1.9" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><subject>Návrh</subject><text>Prosím o vybavenie &amp; potvrdenie.</text></GeneralAgenda>"#;

pub const GENERAL_AGENDA_IDENTIFIER: &str = "http://data.gov.sk/doc/eform/App.GeneralAgenda/1.9";

pub const PREVIEW_XSLT: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform"><xsl:output method="text"/></xsl:stylesheet>"#;
