//! Error types for document signing operations.

use thiserror::Error;

/// Result type for signing operations
pub type SigningResult<T> = Result<T, SigningError>;

/// Every way a signing job, preview or parameter resolution can fail
#[derive(Error, Debug, Clone, PartialEq, Eq, miette::Diagnostic)]
pub enum SigningError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Transformation error: {0}")]
    TransformationError(String),

    #[error("Data container error: {0}")]
    ContainerError(String),

    #[error("Signing cancelled: {0}")]
    SigningCancelled(String),

    #[error("Signature engine error: {0}")]
    AdapterError(String),

    #[error("Signing key error: {0}")]
    KeyError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl SigningError {
    /// Message without the kind prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            SigningError::ValidationError(m)
            | SigningError::TransformationError(m)
            | SigningError::ContainerError(m)
            | SigningError::SigningCancelled(m)
            | SigningError::AdapterError(m)
            | SigningError::KeyError(m)
            | SigningError::IoError(m)
            | SigningError::ConfigurationError(m) => m,
        }
    }
}

impl From<std::io::Error> for SigningError {
    fn from(error: std::io::Error) -> Self {
        SigningError::IoError(error.to_string())
    }
}

impl From<base64::DecodeError> for SigningError {
    fn from(error: base64::DecodeError) -> Self {
        SigningError::ValidationError(format!("Invalid base64 content: {error}"))
    }
}

impl From<serde_json::Error> for SigningError {
    fn from(error: serde_json::Error) -> Self {
        SigningError::ValidationError(format!("Malformed request: {error}"))
    }
}

// XML errors surface from preview rendering; the packer maps its own
// failures to `ContainerError` explicitly.
impl From<quick_xml::Error> for SigningError {
    fn from(error: quick_xml::Error) -> Self {
        SigningError::TransformationError(error.to_string())
    }
}
