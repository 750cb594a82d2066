//! Typed failure delivered to a responder when a job does not produce a signed document.

use std::fmt;

use crate::infra::error::SigningError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Validation,
    Transformation,
    Container,
    Cancelled,
    Adapter,
    Key,
    Io,
    Configuration,
}

impl FailureKind {
    /// Failures caused by the caller or the user rather than the system.
    #[must_use]
    pub fn is_user_fault(&self) -> bool {
        matches!(self, FailureKind::Validation | FailureKind::Cancelled)
    }
}

/// Kind, human-readable message and optional underlying cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    cause: Option<String>,
}

impl Failure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn cause(&self) -> Option<&str> {
        self.cause.as_deref()
    }
}

impl From<SigningError> for Failure {
    fn from(error: SigningError) -> Self {
        let kind = match &error {
            SigningError::ValidationError(_) => FailureKind::Validation,
            SigningError::TransformationError(_) => FailureKind::Transformation,
            SigningError::ContainerError(_) => FailureKind::Container,
            SigningError::SigningCancelled(_) => FailureKind::Cancelled,
            SigningError::AdapterError(_) => FailureKind::Adapter,
            SigningError::KeyError(_) => FailureKind::Key,
            SigningError::IoError(_) => FailureKind::Io,
            SigningError::ConfigurationError(_) => FailureKind::Configuration,
        };
        Failure::new(kind, error.to_string())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
