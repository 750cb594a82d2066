//! Signing parameter resolution.
//!
//! Raw caller input is checked against the document's mime type and turned
//! into `SigningParameters` in one step. The first violated rule is
//! returned as a `ValidationError`; a partially resolved value never leaves
//! this module.

use serde::{Deserialize, Serialize};

use crate::domain::constants::XDC_NAMESPACE;
use crate::domain::crypto::DigestAlgorithm;
use crate::domain::mime::MimeType;
use crate::domain::parameters::{
    parse_family_level, AsicContainer, CadesProfile, DataContainerProfile, Packaging,
    PadesProfile, SignatureFamily, SignatureProfile, SigningParameters, XadesProfile,
};
use crate::infra::error::{SigningError, SigningResult};

/// Caller-supplied parameters as they arrive in a sign request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSigningParameters {
    /// Combined family and level, e.g. `XAdES_BASELINE_B`
    pub level: Option<String>,
    pub container: Option<String>,
    /// Requests data container packing when set to the XDC namespace
    pub container_xmlns: Option<String>,
    pub packaging: Option<String>,
    pub digest_algorithm: Option<String>,
    pub identifier: Option<String>,
    pub schema: Option<String>,
    pub schema_identifier: Option<String>,
    pub transformation: Option<String>,
    pub transformation_identifier: Option<String>,
    pub transformation_output_mime_type: Option<String>,
    pub transformation_language: Option<String>,
    pub transformation_media_destination_type_description: Option<String>,
    #[serde(rename = "checkPDFACompliance")]
    pub check_pdfa_compliance: Option<bool>,
    pub visualization_width: Option<u32>,
}

/// Defaults applied where the caller left a value out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverDefaults {
    pub xades_digest: DigestAlgorithm,
    pub cades_digest: DigestAlgorithm,
    pub pades_digest: DigestAlgorithm,
}

impl Default for ResolverDefaults {
    fn default() -> Self {
        Self {
            xades_digest: DigestAlgorithm::Sha256,
            cades_digest: DigestAlgorithm::Sha256,
            pades_digest: DigestAlgorithm::Sha256,
        }
    }
}

impl ResolverDefaults {
    #[must_use]
    pub fn digest_for(&self, family: SignatureFamily) -> DigestAlgorithm {
        match family {
            SignatureFamily::Xades => self.xades_digest,
            SignatureFamily::Cades => self.cades_digest,
            SignatureFamily::Pades => self.pades_digest,
        }
    }
}

fn invalid(message: impl Into<String>) -> SigningError {
    SigningError::ValidationError(message.into())
}

/// Validate `raw` against the document mime type.
///
/// # Errors
///
/// Returns `ValidationError` describing the first rule the input breaks.
pub fn resolve(
    raw: &RawSigningParameters,
    mime_type: &MimeType,
    defaults: &ResolverDefaults,
) -> SigningResult<SigningParameters> {
    let level = raw
        .level
        .as_deref()
        .ok_or_else(|| invalid("Signature level is required"))?;
    let (family, level) = parse_family_level(level)?;

    let container = raw
        .container
        .as_deref()
        .map(str::parse::<AsicContainer>)
        .transpose()?;
    let is_xml = mime_type.is_xml();

    if family == SignatureFamily::Pades && *mime_type != MimeType::Pdf {
        return Err(invalid(format!(
            "PAdES signature requires a PDF document, got {mime_type}"
        )));
    }
    if !family.allows_container() {
        if container.is_some() {
            return Err(invalid(format!(
                "{family} signature cannot be placed in an ASiC container"
            )));
        }
        if raw.container_xmlns.is_some() {
            return Err(invalid(format!("{family} signature cannot create a data container")));
        }
    }

    let data_container = match raw.container_xmlns.as_deref() {
        None => None,
        Some(ns) => Some(data_container_profile(raw, ns, mime_type)?),
    };

    if raw.transformation.is_some() && !is_xml {
        return Err(invalid(format!(
            "Transformation is only supported for XML documents, got {mime_type}"
        )));
    }

    let output_mime_type = raw
        .transformation_output_mime_type
        .as_deref()
        .map(|value| output_mime_type(value, mime_type, raw.transformation.is_some()))
        .transpose()?;

    let digest_algorithm = match raw.digest_algorithm.as_deref() {
        Some(value) => value.parse()?,
        None => defaults.digest_for(family),
    };

    let packaging = raw
        .packaging
        .as_deref()
        .map(str::parse::<Packaging>)
        .transpose()?;

    let profile = match family {
        SignatureFamily::Xades => SignatureProfile::Xades(XadesProfile {
            level,
            packaging: packaging.unwrap_or(default_packaging(family, container)),
            container,
        }),
        SignatureFamily::Cades => {
            let packaging = packaging.unwrap_or(default_packaging(family, container));
            if packaging == Packaging::Enveloped {
                return Err(invalid("CAdES signature cannot be ENVELOPED"));
            }
            SignatureProfile::Cades(CadesProfile {
                level,
                packaging,
                container,
            })
        }
        SignatureFamily::Pades => {
            if packaging.is_some_and(|p| p != Packaging::Enveloped) {
                return Err(invalid("PAdES signature is always ENVELOPED"));
            }
            SignatureProfile::Pades(PadesProfile {
                level,
                check_pdfa_compliance: raw.check_pdfa_compliance.unwrap_or(false),
            })
        }
    };

    log::debug!(
        "Resolved {} {} with {} for {}",
        family,
        level.as_str(),
        digest_algorithm,
        mime_type
    );

    Ok(SigningParameters {
        profile,
        digest_algorithm,
        data_container,
        transformation: raw.transformation.clone(),
        transformation_output_mime_type: output_mime_type,
        visualization_width: raw.visualization_width.unwrap_or(0),
    })
}

fn default_packaging(family: SignatureFamily, container: Option<AsicContainer>) -> Packaging {
    if container.is_some() {
        return Packaging::Detached;
    }
    match family {
        SignatureFamily::Xades | SignatureFamily::Cades => Packaging::Enveloping,
        SignatureFamily::Pades => Packaging::Enveloped,
    }
}

fn data_container_profile(
    raw: &RawSigningParameters,
    namespace: &str,
    mime_type: &MimeType,
) -> SigningResult<DataContainerProfile> {
    if namespace != XDC_NAMESPACE {
        return Err(invalid(format!("Unsupported containerXmlns: {namespace}")));
    }
    if !mime_type.is_xml() {
        return Err(invalid(format!(
            "Data container can only wrap XML documents, got {mime_type}"
        )));
    }

    // An existing container is never re-wrapped, so it needs no identifier
    let identifier = match (raw.identifier.as_deref(), mime_type) {
        (Some(id), _) => id.to_string(),
        (None, MimeType::XmlDataContainer) => String::new(),
        (None, _) => return Err(invalid("Identifier is required to create a data container")),
    };

    let mut profile = DataContainerProfile::new(identifier);
    profile.schema = raw.schema.clone();
    profile.schema_location = raw.schema_identifier.clone();
    profile.transformation = raw.transformation.clone();
    profile.transformation_location = raw.transformation_identifier.clone();
    profile.transformation_language = raw.transformation_language.clone();
    profile.media_destination = raw
        .transformation_media_destination_type_description
        .clone();
    Ok(profile)
}

fn output_mime_type(
    value: &str,
    document_mime_type: &MimeType,
    has_transformation: bool,
) -> SigningResult<MimeType> {
    let output = MimeType::parse(value);
    if !matches!(output, MimeType::Text | MimeType::Html) {
        return Err(invalid(format!(
            "Unsupported transformation output mime type: {value}"
        )));
    }
    if document_mime_type.is_image() || *document_mime_type == MimeType::Pdf {
        return Err(invalid(format!(
            "Transformation output cannot be declared for {document_mime_type} documents"
        )));
    }
    if !has_transformation {
        return Err(invalid(
            "Transformation output mime type requires a transformation",
        ));
    }
    Ok(output)
}
