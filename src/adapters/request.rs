//! JSON sign request body.
//!
//! ```json
//! {
//!   "document": { "filename": "form.xml", "content": "PD94bWwg..." },
//!   "parameters": { "level": "XAdES_BASELINE_B", "container": "ASiC_E" },
//!   "payloadMimeType": "application/xml;base64"
//! }
//! ```

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::domain::document::Document;
use crate::domain::mime::MimeType;
use crate::domain::parameters::SigningParameters;
use crate::infra::error::{SigningError, SigningResult};
use crate::services::parameters::{resolve, RawSigningParameters, ResolverDefaults};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequestBody {
    pub document: Option<RequestDocument>,
    pub parameters: Option<RawSigningParameters>,
    pub payload_mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDocument {
    pub filename: Option<String>,
    pub content: Option<String>,
}

impl SignRequestBody {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for malformed JSON.
    pub fn from_json(json: &str) -> SigningResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn payload_mime_type(&self) -> SigningResult<&str> {
        self.payload_mime_type
            .as_deref()
            .ok_or_else(|| SigningError::ValidationError("PayloadMimeType is required".to_string()))
    }

    fn is_base64(&self) -> bool {
        self.payload_mime_type
            .as_deref()
            .is_some_and(|m| m.contains("base64"))
    }

    /// Decode the document payload.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the mime type, document or content is
    /// missing, or the base64 content does not decode.
    pub fn document(&self) -> SigningResult<Document> {
        let mime_type = MimeType::parse(self.payload_mime_type()?);
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| SigningError::ValidationError("Document is required".to_string()))?;
        let content = document.content.as_deref().ok_or_else(|| {
            SigningError::ValidationError("Document.Content is required".to_string())
        })?;

        let bytes = if self.is_base64() {
            base64::engine::general_purpose::STANDARD.decode(content.trim())?
        } else {
            content.as_bytes().to_vec()
        };

        let mut result = Document::new(bytes, mime_type);
        if let Some(name) = document.filename.as_deref() {
            result = result.with_filename(name);
        }
        Ok(result)
    }

    /// Validate the parameters against the decoded document.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for missing or inconsistent parameters.
    pub fn signing_parameters(&self, defaults: &ResolverDefaults) -> SigningResult<SigningParameters> {
        let raw = self
            .parameters
            .as_ref()
            .ok_or_else(|| SigningError::ValidationError("Parameters are required".to_string()))?;
        let document = self.document()?;

        if self.is_base64() {
            let decoded = RawSigningParameters {
                schema: decode_text(raw.schema.as_deref(), "schema")?,
                transformation: decode_text(raw.transformation.as_deref(), "transformation")?,
                ..raw.clone()
            };
            resolve(&decoded, document.mime_type(), defaults)
        } else {
            resolve(raw, document.mime_type(), defaults)
        }
    }

    /// Document and resolved parameters together.
    ///
    /// # Errors
    ///
    /// See [`SignRequestBody::document`] and [`SignRequestBody::signing_parameters`].
    pub fn into_job_inputs(
        &self,
        defaults: &ResolverDefaults,
    ) -> SigningResult<(Document, SigningParameters)> {
        Ok((self.document()?, self.signing_parameters(defaults)?))
    }
}

fn decode_text(value: Option<&str>, field: &str) -> SigningResult<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let bytes = base64::engine::general_purpose::STANDARD.decode(value.trim())?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|_| SigningError::ValidationError(format!("Field {field} is not valid UTF-8")))
}
