//! Shared error type across ceprism crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed payload or arguments.
    BadRequest,
    /// Event failed schema or semantic validation.
    ValidationFailed,
    /// Attribute not available on the event's spec version, or bad extension.
    InvalidAttribute,
    /// Request carries no recognizable CloudEvent.
    UnrecognizedMode,
    /// Rejected by receiver policy.
    NotAllowed,
    /// Unsupported spec version.
    UnsupportedVersion,
    /// Internal / configuration error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::ValidationFailed => "VALIDATION_FAILED",
            ClientCode::InvalidAttribute => "INVALID_ATTRIBUTE",
            ClientCode::UnrecognizedMode => "UNRECOGNIZED_MODE",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CeError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum CeError {
    /// Caller passed a payload that cannot be a CloudEvent body.
    #[error("argument error: {0}")]
    Argument(String),
    /// Schema or semantic validation failed. `errors` holds the
    /// underlying validator messages (may be empty).
    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },
    #[error("attribute error: {0}")]
    Attribute(String),
    #[error("{0}")]
    UnrecognizedMode(String),
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CeError {
    /// Validation error without underlying validator details.
    pub fn validation(message: impl Into<String>) -> Self {
        CeError::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Validation error carrying the validator's error list.
    pub fn validation_with(message: impl Into<String>, errors: Vec<String>) -> Self {
        CeError::Validation {
            message: message.into(),
            errors,
        }
    }

    /// Underlying validator errors (empty for non-validation errors).
    pub fn details(&self) -> &[String] {
        match self {
            CeError::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            CeError::Argument(_) => ClientCode::BadRequest,
            CeError::Validation { .. } => ClientCode::ValidationFailed,
            CeError::Attribute(_) => ClientCode::InvalidAttribute,
            CeError::UnrecognizedMode(_) => ClientCode::UnrecognizedMode,
            CeError::NotAllowed(_) => ClientCode::NotAllowed,
            CeError::UnsupportedVersion(_) => ClientCode::UnsupportedVersion,
            CeError::Internal(_) => ClientCode::Internal,
        }
    }
}
