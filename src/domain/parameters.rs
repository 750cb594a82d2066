//! Resolved signing parameters.
//!
//! A `SigningParameters` value only exists after validation against the
//! document's mime type (see `services::parameters`). Family-specific data
//! lives in `SignatureProfile`, whose variants make impossible combinations
//! (such as PAdES inside an ASiC container) unrepresentable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::crypto::{Certificate, CertificateChain, DigestAlgorithm};
use crate::domain::mime::MimeType;
use crate::infra::error::SigningError;

/// Advanced electronic signature family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureFamily {
    #[serde(rename = "XAdES")]
    Xades,
    #[serde(rename = "CAdES")]
    Cades,
    #[serde(rename = "PAdES")]
    Pades,
}

impl SignatureFamily {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureFamily::Xades => "XAdES",
            SignatureFamily::Cades => "CAdES",
            SignatureFamily::Pades => "PAdES",
        }
    }

    /// Whether an ASiC container or a data container may be requested.
    #[must_use]
    pub fn allows_container(&self) -> bool {
        match self {
            SignatureFamily::Xades | SignatureFamily::Cades => true,
            SignatureFamily::Pades => false,
        }
    }
}

impl fmt::Display for SignatureFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Baseline conformance level (ETSI EN 319 1x2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureLevel {
    BaselineB,
    BaselineT,
    BaselineLt,
    BaselineLta,
}

impl SignatureLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureLevel::BaselineB => "BASELINE_B",
            SignatureLevel::BaselineT => "BASELINE_T",
            SignatureLevel::BaselineLt => "BASELINE_LT",
            SignatureLevel::BaselineLta => "BASELINE_LTA",
        }
    }
}

impl FromStr for SignatureLevel {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASELINE_B" => Ok(SignatureLevel::BaselineB),
            "BASELINE_T" => Ok(SignatureLevel::BaselineT),
            "BASELINE_LT" => Ok(SignatureLevel::BaselineLt),
            "BASELINE_LTA" => Ok(SignatureLevel::BaselineLta),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported signature level: {s}"
            ))),
        }
    }
}

/// Parse a combined level such as `XAdES_BASELINE_B`.
pub fn parse_family_level(value: &str) -> Result<(SignatureFamily, SignatureLevel), SigningError> {
    let (family, level) = value.split_once('_').ok_or_else(|| {
        SigningError::ValidationError(format!("Unsupported signature level: {value}"))
    })?;

    let family = match family.to_ascii_uppercase().as_str() {
        "XADES" => SignatureFamily::Xades,
        "CADES" => SignatureFamily::Cades,
        "PADES" => SignatureFamily::Pades,
        _ => {
            return Err(SigningError::ValidationError(format!(
                "Unsupported signature family: {family}"
            )))
        }
    };

    Ok((family, level.parse()?))
}

/// How the signature relates to the signed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Packaging {
    Enveloped,
    Enveloping,
    Detached,
}

impl FromStr for Packaging {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ENVELOPED" => Ok(Packaging::Enveloped),
            "ENVELOPING" => Ok(Packaging::Enveloping),
            "DETACHED" => Ok(Packaging::Detached),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported signature packaging: {s}"
            ))),
        }
    }
}

/// Associated Signature Container flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsicContainer {
    #[serde(rename = "ASiC_E")]
    AsicE,
    #[serde(rename = "ASiC_S")]
    AsicS,
}

impl AsicContainer {
    #[must_use]
    pub fn mime_type(&self) -> MimeType {
        match self {
            AsicContainer::AsicE => MimeType::AsicE,
            AsicContainer::AsicS => MimeType::AsicS,
        }
    }
}

impl FromStr for AsicContainer {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "ASIC_E" => Ok(AsicContainer::AsicE),
            "ASIC_S" => Ok(AsicContainer::AsicS),
            _ => Err(SigningError::ValidationError(format!(
                "Unsupported container: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XadesProfile {
    pub level: SignatureLevel,
    pub packaging: Packaging,
    pub container: Option<AsicContainer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadesProfile {
    pub level: SignatureLevel,
    pub packaging: Packaging,
    pub container: Option<AsicContainer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadesProfile {
    pub level: SignatureLevel,
    /// Ask the caller to verify PDF/A compliance before signing.
    pub check_pdfa_compliance: bool,
}

/// Family-specific signature profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family")]
pub enum SignatureProfile {
    #[serde(rename = "XAdES")]
    Xades(XadesProfile),
    #[serde(rename = "CAdES")]
    Cades(CadesProfile),
    #[serde(rename = "PAdES")]
    Pades(PadesProfile),
}

impl SignatureProfile {
    #[must_use]
    pub fn family(&self) -> SignatureFamily {
        match self {
            SignatureProfile::Xades(_) => SignatureFamily::Xades,
            SignatureProfile::Cades(_) => SignatureFamily::Cades,
            SignatureProfile::Pades(_) => SignatureFamily::Pades,
        }
    }

    #[must_use]
    pub fn level(&self) -> SignatureLevel {
        match self {
            SignatureProfile::Xades(p) => p.level,
            SignatureProfile::Cades(p) => p.level,
            SignatureProfile::Pades(p) => p.level,
        }
    }

    #[must_use]
    pub fn container(&self) -> Option<AsicContainer> {
        match self {
            SignatureProfile::Xades(p) => p.container,
            SignatureProfile::Cades(p) => p.container,
            SignatureProfile::Pades(_) => None,
        }
    }
}

/// Schema references written into a new XML data container envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContainerProfile {
    /// Form identifier URI, e.g. `http://data.gov.sk/doc/eform/App.GeneralAgenda/1.9`
    pub identifier: String,
    /// Form version; derived from the identifier's last path segment when absent
    pub version: Option<String>,
    /// XSD the payload conforms to
    pub schema: Option<String>,
    pub schema_location: Option<String>,
    /// Presentation stylesheet text, digested into the envelope
    pub transformation: Option<String>,
    pub transformation_location: Option<String>,
    pub transformation_language: Option<String>,
    /// `MediaDestinationTypeDescription`, e.g. `TXT` or `HTML`
    pub media_destination: Option<String>,
}

impl DataContainerProfile {
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: None,
            schema: None,
            schema_location: None,
            transformation: None,
            transformation_location: None,
            transformation_language: None,
            media_destination: None,
        }
    }

    /// Explicit version, or the last segment of the identifier: after the
    /// last `/` for URLs, after the last `:` for URNs.
    #[must_use]
    pub fn effective_version(&self) -> &str {
        if let Some(v) = self.version.as_deref() {
            return v;
        }
        let identifier = self.identifier.trim_end_matches(['/', ':']);
        let separator = if identifier.contains('/') { '/' } else { ':' };
        identifier.rsplit(separator).next().unwrap_or_default()
    }
}

/// Fully validated parameters for one signing job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningParameters {
    pub profile: SignatureProfile,
    pub digest_algorithm: DigestAlgorithm,
    /// Present when the document must be wrapped into an XML data container
    pub data_container: Option<DataContainerProfile>,
    /// Stylesheet used for previews and referenced from new envelopes
    pub transformation: Option<String>,
    /// Caller-declared preview output type (text/plain or text/html)
    pub transformation_output_mime_type: Option<MimeType>,
    pub visualization_width: u32,
}

impl SigningParameters {
    /// Enveloped PAdES parameters for a PDF opened from disk.
    #[must_use]
    pub fn for_pdf(level: SignatureLevel, digest_algorithm: DigestAlgorithm) -> Self {
        Self::plain(
            SignatureProfile::Pades(PadesProfile {
                level,
                check_pdfa_compliance: false,
            }),
            digest_algorithm,
        )
    }

    /// Detached XAdES inside an ASiC container, for any other file.
    #[must_use]
    pub fn for_asic_xades(
        level: SignatureLevel,
        container: AsicContainer,
        digest_algorithm: DigestAlgorithm,
    ) -> Self {
        Self::plain(
            SignatureProfile::Xades(XadesProfile {
                level,
                packaging: Packaging::Detached,
                container: Some(container),
            }),
            digest_algorithm,
        )
    }

    fn plain(profile: SignatureProfile, digest_algorithm: DigestAlgorithm) -> Self {
        Self {
            profile,
            digest_algorithm,
            data_container: None,
            transformation: None,
            transformation_output_mime_type: None,
            visualization_width: 0,
        }
    }

    #[must_use]
    pub fn family(&self) -> SignatureFamily {
        self.profile.family()
    }

    #[must_use]
    pub fn container(&self) -> Option<AsicContainer> {
        self.profile.container()
    }

    #[must_use]
    pub fn should_create_data_container(&self) -> bool {
        self.data_container.is_some()
    }

    #[must_use]
    pub fn check_pdfa_compliance(&self) -> bool {
        matches!(&self.profile, SignatureProfile::Pades(p) if p.check_pdfa_compliance)
    }
}

/// Profile bound to the signer identity for one signing transition.
///
/// Built once and shared by both engine phases so the data-to-sign and the
/// assembled signature see identical inputs.
#[derive(Debug, Clone)]
pub struct BoundProfile {
    pub profile: SignatureProfile,
    pub digest_algorithm: DigestAlgorithm,
    pub signing_certificate: Certificate,
    pub certificate_chain: CertificateChain,
}
